use futures::stream::{self, StreamExt};
use notarium_core::{Credential, CredentialDocument, CredentialSubject, VerifyResponse};
use notarium_ledger::{Address, Ledger, LedgerConnector};
use notarium_notify::NotificationDispatcher;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::cancel::CancelSignal;
use crate::config::AnchoringConfig;
use crate::coordinator::{AnchorOutcome, AnchoringCoordinator};
use crate::error::{BatchError, VerifyError};
use crate::verifier::{VerificationCoordinator, Verdict};

/// Parameters shared by every item of an anchoring batch.
#[derive(Clone)]
pub struct AnchorParams {
    pub endpoint: String,
    pub issuer: String,
    pub contract: Address,
    pub private_key: Zeroizing<String>,
}

impl fmt::Debug for AnchorParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorParams")
            .field("endpoint", &self.endpoint)
            .field("issuer", &self.issuer)
            .field("contract", &self.contract)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Anchoring context a verification batch is checked against.
#[derive(Debug, Clone)]
pub struct VerifyParams {
    pub endpoint: String,
    pub contract: Address,
    pub account: Address,
}

/// Runs anchoring and verification over ordered batches, one ledger
/// connection per batch.
pub struct BatchOrchestrator {
    connector: Arc<dyn LedgerConnector>,
    config: AnchoringConfig,
    notifier: Option<Arc<NotificationDispatcher>>,
}

impl BatchOrchestrator {
    pub fn new(connector: Arc<dyn LedgerConnector>, config: AnchoringConfig) -> Self {
        Self {
            connector,
            config,
            notifier: None,
        }
    }

    /// Notify recipients of anchored credentials through `dispatcher`.
    pub fn with_notifier(mut self, dispatcher: Arc<NotificationDispatcher>) -> Self {
        self.notifier = Some(dispatcher);
        self
    }

    pub fn config(&self) -> &AnchoringConfig {
        &self.config
    }

    /// Anchor every subject, returning one outcome per subject in input
    /// order. Only connection and key failures abort the batch.
    pub async fn anchor_batch(
        &self,
        subjects: &[CredentialSubject],
        params: &AnchorParams,
        cancel: CancelSignal,
    ) -> Result<Vec<AnchorOutcome>, BatchError> {
        let ledger = self
            .connector
            .connect(&params.endpoint)
            .await
            .map_err(BatchError::Connection)?;

        let context = match ledger.signing_context(&params.private_key) {
            Ok(context) => context,
            Err(e) => {
                close_quietly(ledger.as_ref()).await;
                return Err(BatchError::Key(e));
            }
        };

        tracing::info!(
            items = subjects.len(),
            ledger = ledger.ledger_id(),
            issuer = %params.issuer,
            contract = %params.contract,
            account = %context.account(),
            "anchoring batch started"
        );

        let coordinator = AnchoringCoordinator::new(
            Arc::clone(&ledger),
            context,
            params.issuer.clone(),
            params.contract.clone(),
            self.config.clone(),
        );

        let outcomes: Vec<AnchorOutcome> = stream::iter(subjects)
            .map(|subject| {
                let coordinator = &coordinator;
                let cancel = cancel.clone();
                async move {
                    let outcome = coordinator.anchor(subject, cancel).await;
                    if let (Some(notifier), AnchorOutcome::Anchored(credential)) =
                        (&self.notifier, &outcome)
                    {
                        notifier.notify(credential).await;
                    }
                    outcome
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        close_quietly(ledger.as_ref()).await;

        let anchored = outcomes.iter().filter(|o| o.is_anchored()).count();
        tracing::info!(
            items = outcomes.len(),
            anchored,
            failed = outcomes.len() - anchored,
            "anchoring batch finished"
        );
        Ok(outcomes)
    }

    /// Verify documents in order. Invalid items mark the response; the first
    /// query or encoding error aborts the batch.
    pub async fn verify_batch(
        &self,
        documents: &[CredentialDocument],
        params: &VerifyParams,
    ) -> Result<VerifyResponse, VerifyError> {
        let (ledger, verifier) = self.open_verifier(params).await?;
        let result = verifier
            .verify_all(documents.iter().map(CredentialDocument::data))
            .await;
        close_quietly(ledger.as_ref()).await;

        if let Ok(response) = &result {
            tracing::info!(
                items = documents.len(),
                valid = response.valid,
                code = %response.error.code,
                "verification batch finished"
            );
        }
        result
    }

    /// Verify full credentials and notify the recipients of the valid ones.
    /// Verification errors abort the batch as in [`Self::verify_batch`];
    /// notification failures are only logged.
    pub async fn verify_and_notify(
        &self,
        credentials: &[Credential],
        params: &VerifyParams,
    ) -> Result<VerifyResponse, VerifyError> {
        let (ledger, verifier) = self.open_verifier(params).await?;
        let mut response = VerifyResponse::ok();
        let mut outcome = Ok(());

        for credential in credentials {
            match verifier.verify(&credential.credential_data).await {
                Ok(Verdict::Valid) => {
                    if let Some(notifier) = &self.notifier {
                        notifier.notify(credential).await;
                    }
                }
                Ok(Verdict::Invalid) => response.record_invalid(),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        close_quietly(ledger.as_ref()).await;

        outcome.map(|()| response)
    }

    async fn open_verifier(
        &self,
        params: &VerifyParams,
    ) -> Result<(Arc<dyn Ledger>, VerificationCoordinator), VerifyError> {
        let ledger = self
            .connector
            .connect(&params.endpoint)
            .await
            .map_err(VerifyError::Connection)?;
        let verifier = VerificationCoordinator::new(
            Arc::clone(&ledger),
            params.contract.clone(),
            params.account.clone(),
        );
        Ok((ledger, verifier))
    }
}

async fn close_quietly(ledger: &dyn Ledger) {
    if let Err(e) = ledger.close().await {
        tracing::warn!(error = %e, "ledger connection did not close cleanly");
    }
}
