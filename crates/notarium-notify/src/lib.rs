//! Notarium Notification Layer
//!
//! Delivers anchored credentials to their recipients. Mail transport and
//! code-image rendering are external collaborators behind [`Mailer`] and
//! [`CodeRenderer`]; a failed notification never affects the credential.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mailers;
pub mod message;
pub mod traits;

pub use config::NotificationConfig;
pub use dispatcher::NotificationDispatcher;
pub use error::NotifyError;
pub use mailers::{LogMailer, MemoryMailer, OutboxMailer};
pub use message::{compose, verification_url, Attachment, MailMessage};
pub use traits::{CodeRenderer, Mailer};
