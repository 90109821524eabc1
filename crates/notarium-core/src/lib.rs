//! Notarium Core: credential data model, fingerprinting, proofs, and the
//! anchoring state machine shared by the coordinator and notification crates.

pub mod anchor_state;
pub mod error;
pub mod fingerprint;
pub mod proof;
pub mod timestamp;
pub mod types;

pub use anchor_state::{AnchorEvent, AnchorState, AnchorStateMachine};
pub use error::CoreError;
pub use fingerprint::{canonicalize, fingerprint, Digest, Fingerprint};
pub use proof::build_proof;
pub use types::{
    Credential, CredentialData, CredentialDocument, CredentialMetadata, CredentialSubject,
    ErrorDetail, Proof, Recipient, VerifyResponse,
};
