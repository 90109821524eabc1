use crate::types::TxRef;

/// Ledger collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Connection(String),

    #[error("invalid signing key: {0}")]
    Key(String),

    #[error("transaction rejected: {0}")]
    Submission(String),

    #[error("transaction not yet mined: {0}")]
    NotYetMined(TxRef),

    #[error("ledger query failed: {0}")]
    Query(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("ledger connection closed")]
    Closed,
}
