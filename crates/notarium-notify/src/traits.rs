use async_trait::async_trait;

use crate::error::NotifyError;
use crate::message::MailMessage;

/// Mail transport collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError>;
}

/// Renders a scannable code (e.g. a QR image) for a URL-safe payload.
#[async_trait]
pub trait CodeRenderer: Send + Sync {
    /// Return the encoded image bytes.
    async fn render(&self, payload: &str) -> Result<Vec<u8>, NotifyError>;

    /// MIME type of the rendered image.
    fn content_type(&self) -> &str {
        "image/png"
    }
}
