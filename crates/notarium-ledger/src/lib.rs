//! Notarium Ledger Layer
//!
//! The ledger is an external collaborator. This crate fixes the contract the
//! coordinators program against and ships an in-process ledger for
//! development and tests.

pub mod adapters;
pub mod error;
pub mod traits;
pub mod types;

pub use adapters::memory::{AnchorRecord, LedgerSnapshot, MemoryConnector, MemoryLedger};
pub use error::LedgerError;
pub use traits::{Ledger, LedgerConnector};
pub use types::{Address, Receipt, SigningContext, TxRef};
