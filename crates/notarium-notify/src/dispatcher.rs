use notarium_core::{fingerprint, Credential};
use std::sync::Arc;

use crate::config::NotificationConfig;
use crate::error::NotifyError;
use crate::message::{compose, verification_url};
use crate::traits::{CodeRenderer, Mailer};

/// Forwards anchored credentials to their recipients.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    renderer: Option<Arc<dyn CodeRenderer>>,
    config: NotificationConfig,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, config: NotificationConfig) -> Self {
        Self {
            mailer,
            renderer: None,
            config,
        }
    }

    /// Attach a code-image renderer; without one the URL is sent as text only.
    pub fn with_renderer(mut self, renderer: Arc<dyn CodeRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Compose and send the notification for one anchored credential.
    pub async fn dispatch(&self, credential: &Credential) -> Result<(), NotifyError> {
        let metadata = credential
            .metadata
            .as_ref()
            .ok_or_else(|| NotifyError::NotAnchored(credential.id().to_string()))?;

        let fingerprint = fingerprint(&credential.credential_data)?;
        let url = verification_url(&self.config.verification_base_url, &fingerprint.digest);

        let code_image = match &self.renderer {
            Some(renderer) => Some((
                renderer.render(&url).await?,
                renderer.content_type().to_string(),
            )),
            None => None,
        };

        let message = compose(
            &self.config,
            credential,
            metadata,
            &fingerprint.canonical,
            &url,
            code_image,
        );
        self.mailer.send(&message).await?;

        tracing::info!(
            credential_id = %credential.id(),
            to = %metadata.recipient.email,
            digest = %fingerprint.digest,
            "credential notification sent"
        );
        Ok(())
    }

    /// Best-effort dispatch: failures are logged and reported as `false`.
    pub async fn notify(&self, credential: &Credential) -> bool {
        match self.dispatch(credential).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    credential_id = %credential.id(),
                    error = %e,
                    "credential notification failed"
                );
                false
            }
        }
    }
}
