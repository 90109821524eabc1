use chrono::SubsecRound;
use notarium_core::{
    build_proof, fingerprint, AnchorEvent, AnchorState, AnchorStateMachine, Credential,
    CredentialData, CredentialMetadata, CredentialSubject,
};
use notarium_ledger::{Address, Ledger, SigningContext};
use std::sync::Arc;

use crate::cancel::CancelSignal;
use crate::config::AnchoringConfig;
use crate::error::AnchorError;
use crate::poll::{wait_for_receipt, PollError};

/// Result of anchoring one subject.
#[derive(Debug)]
pub enum AnchorOutcome {
    Anchored(Credential),
    Failed(AnchorFailure),
}

/// A per-item failure, with the credential as far as it was built.
#[derive(Debug)]
pub struct AnchorFailure {
    pub state: AnchorState,
    /// Absent when the subject was rejected before a credential existed.
    pub credential: Option<Credential>,
    pub error: AnchorError,
}

impl AnchorOutcome {
    pub fn state(&self) -> AnchorState {
        match self {
            Self::Anchored(_) => AnchorState::MetadataAttached,
            Self::Failed(f) => f.state,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Anchored(c) => Some(c),
            Self::Failed(f) => f.credential.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&AnchorError> {
        match self {
            Self::Anchored(_) => None,
            Self::Failed(f) => Some(&f.error),
        }
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::Anchored(_))
    }

    pub fn into_credential(self) -> Option<Credential> {
        match self {
            Self::Anchored(c) => Some(c),
            Self::Failed(f) => f.credential,
        }
    }
}

/// Anchors single credentials over a shared ledger connection.
pub struct AnchoringCoordinator {
    ledger: Arc<dyn Ledger>,
    context: SigningContext,
    issuer: String,
    contract: Address,
    config: AnchoringConfig,
}

impl AnchoringCoordinator {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        context: SigningContext,
        issuer: impl Into<String>,
        contract: Address,
        config: AnchoringConfig,
    ) -> Self {
        Self {
            ledger,
            context,
            issuer: issuer.into(),
            contract,
            config,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    /// Run one subject through the full lifecycle. Every failure is captured
    /// in the returned outcome.
    pub async fn anchor(&self, subject: &CredentialSubject, cancel: CancelSignal) -> AnchorOutcome {
        if let Err(e) = subject.validate() {
            tracing::warn!(error = %e, "subject rejected");
            let state = AnchorStateMachine::transition(AnchorState::Built, AnchorEvent::Reject)
                .unwrap_or(AnchorState::Rejected);
            return AnchorOutcome::Failed(AnchorFailure {
                state,
                credential: None,
                error: AnchorError::InvalidSubject(e),
            });
        }

        let proof = build_proof(&self.config.proof_type, self.contract.as_str());
        let data = CredentialData::build(subject, &self.issuer, proof);
        let mut state = AnchorState::Built;

        match self.confirm(&data, subject, &mut state, cancel).await {
            Ok(metadata) => {
                let mut credential = Credential::new(data);
                credential.metadata = Some(metadata);
                tracing::info!(
                    credential_id = %credential.id(),
                    state = %state,
                    "credential anchored"
                );
                AnchorOutcome::Anchored(credential)
            }
            Err(error) => {
                tracing::warn!(
                    credential_id = %data.id,
                    state = %state,
                    error = %error,
                    "credential anchoring failed"
                );
                AnchorOutcome::Failed(AnchorFailure {
                    state,
                    credential: Some(Credential::new(data)),
                    error,
                })
            }
        }
    }

    async fn confirm(
        &self,
        data: &CredentialData,
        subject: &CredentialSubject,
        state: &mut AnchorState,
        cancel: CancelSignal,
    ) -> Result<CredentialMetadata, AnchorError> {
        let digest = match fingerprint(data) {
            Ok(fp) => {
                advance(state, AnchorEvent::Digest)?;
                fp.digest
            }
            Err(e) => {
                advance(state, AnchorEvent::EncodingFail)?;
                return Err(AnchorError::Encoding(e));
            }
        };

        if cancel.is_cancelled() {
            advance(state, AnchorEvent::Cancel)?;
            return Err(AnchorError::Cancelled { tx: None });
        }

        let tx = match self
            .ledger
            .submit_anchor(&self.contract, &self.context, &digest, data.expiration_epoch())
            .await
        {
            Ok(tx) => {
                advance(state, AnchorEvent::Submit)?;
                tx
            }
            Err(e) => {
                advance(state, AnchorEvent::SubmissionFail)?;
                return Err(AnchorError::Submission(e));
            }
        };
        tracing::debug!(credential_id = %data.id, %tx, %digest, "anchor submitted");

        let receipt = match wait_for_receipt(self.ledger.as_ref(), &tx, &self.config.poll, cancel)
            .await
        {
            Ok(receipt) => {
                advance(state, AnchorEvent::Confirm)?;
                receipt
            }
            Err(PollError::TimedOut { waited, last_error }) => {
                advance(state, AnchorEvent::TimeOut)?;
                return Err(AnchorError::ConfirmationTimeout {
                    tx,
                    waited,
                    last_error,
                });
            }
            Err(PollError::Cancelled) => {
                advance(state, AnchorEvent::Cancel)?;
                return Err(AnchorError::Cancelled { tx: Some(tx) });
            }
        };

        let metadata = CredentialMetadata {
            block_number: receipt.block_number.to_string(),
            timestamp: receipt.timestamp.trunc_subsecs(3),
            transaction: receipt.tx.to_string(),
            recipient: subject.recipient.clone(),
        };
        advance(state, AnchorEvent::AttachMetadata)?;
        Ok(metadata)
    }
}

fn advance(state: &mut AnchorState, event: AnchorEvent) -> Result<(), AnchorError> {
    *state = AnchorStateMachine::transition(*state, event).map_err(AnchorError::StateMachine)?;
    Ok(())
}
