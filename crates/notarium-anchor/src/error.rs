use notarium_core::CoreError;
use notarium_ledger::{LedgerError, TxRef};
use std::time::Duration;

/// Per-item anchoring failures. None of these abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("invalid subject: {0}")]
    InvalidSubject(#[source] CoreError),

    #[error("credential could not be canonicalized: {0}")]
    Encoding(#[source] CoreError),

    #[error("anchor submission failed: {0}")]
    Submission(#[source] LedgerError),

    #[error("no receipt for {tx} after {waited:?}")]
    ConfirmationTimeout {
        tx: TxRef,
        waited: Duration,
        last_error: Option<String>,
    },

    /// `tx` is absent when cancellation came before submission.
    #[error("anchoring cancelled{}", cancelled_at(.tx))]
    Cancelled { tx: Option<TxRef> },

    #[error(transparent)]
    StateMachine(CoreError),
}

fn cancelled_at(tx: &Option<TxRef>) -> String {
    match tx {
        Some(tx) => format!(" while confirming {}", tx),
        None => " before submission".into(),
    }
}

/// Failures that abort an anchoring batch before any item runs.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("ledger connection failed: {0}")]
    Connection(#[source] LedgerError),

    #[error("signing context unavailable: {0}")]
    Key(#[source] LedgerError),
}

/// Failures that abort a verification batch.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("ledger connection failed: {0}")]
    Connection(#[source] LedgerError),

    #[error("credential {credential_id} could not be canonicalized: {source}")]
    Encoding {
        credential_id: String,
        source: CoreError,
    },

    #[error("verification query for {credential_id} failed: {source}")]
    Query {
        credential_id: String,
        source: LedgerError,
    },
}
