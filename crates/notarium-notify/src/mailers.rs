//! Development mailers. Production transports live outside this workspace.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::error::NotifyError;
use crate::message::MailMessage;
use crate::traits::Mailer;

/// Writes each message as a JSON file into a directory.
pub struct OutboxMailer {
    dir: PathBuf,
    counter: AtomicU64,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    fn file_name(&self, message: &MailMessage) -> String {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        let recipient: String = message
            .to
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!(
            "{}-{:04}-{}.json",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%3f"),
            seq,
            recipient
        )
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(self.file_name(message));
        let json = serde_json::to_vec_pretty(message)?;
        tokio::fs::write(&path, json).await?;
        tracing::debug!(path = %path.display(), to = %message.to, "message written to outbox");
        Ok(())
    }
}

/// Logs messages without delivering them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "mail delivery skipped (log mailer)"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory; recipients can be set to bounce.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<MailMessage>>,
    rejected: Mutex<HashSet<String>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries to `recipient` fail.
    pub async fn reject_recipient(&self, recipient: impl Into<String>) {
        self.rejected.lock().await.insert(recipient.into());
    }

    /// Messages delivered so far.
    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        if self.rejected.lock().await.contains(&message.to) {
            return Err(NotifyError::Mail(format!("mailbox {} unavailable", message.to)));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
