/// Notification errors. None of these invalidate a credential.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("credential {0} has no anchoring metadata")]
    NotAnchored(String),

    #[error("credential encoding failed: {0}")]
    Encoding(#[from] notarium_core::CoreError),

    #[error("code image rendering failed: {0}")]
    Render(String),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
