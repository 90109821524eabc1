use crate::anchor_state::{AnchorEvent, AnchorState};

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid credential subject: {0}")]
    InvalidSubject(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("invalid anchoring transition from {from} on {event}")]
    InvalidStateTransition { from: AnchorState, event: AnchorEvent },
}
