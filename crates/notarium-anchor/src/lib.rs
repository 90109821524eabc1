//! Notarium Anchoring Layer
//!
//! Drives credentials through the anchoring lifecycle against a ledger,
//! verifies anchored credentials, and runs both operations over ordered
//! batches that share one ledger connection.

pub mod batch;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod poll;
pub mod verifier;

pub use batch::{AnchorParams, BatchOrchestrator, VerifyParams};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use config::{AnchoringConfig, PollConfig};
pub use coordinator::{AnchorFailure, AnchorOutcome, AnchoringCoordinator};
pub use error::{AnchorError, BatchError, VerifyError};
pub use poll::{wait_for_receipt, PollError};
pub use verifier::{VerificationCoordinator, Verdict};
