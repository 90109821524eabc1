use notarium_core::{fingerprint, CredentialData, VerifyResponse};
use notarium_ledger::{Address, Ledger};
use std::sync::Arc;

use crate::error::VerifyError;

/// Ledger verdict for one credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

/// Checks credentials against the anchors recorded for one contract and
/// signer account.
pub struct VerificationCoordinator {
    ledger: Arc<dyn Ledger>,
    contract: Address,
    account: Address,
}

impl VerificationCoordinator {
    pub fn new(ledger: Arc<dyn Ledger>, contract: Address, account: Address) -> Self {
        Self {
            ledger,
            contract,
            account,
        }
    }

    /// Recompute the canonical form and ask the ledger whether it was
    /// anchored by the configured account.
    pub async fn verify(&self, data: &CredentialData) -> Result<Verdict, VerifyError> {
        let fp = fingerprint(data).map_err(|source| VerifyError::Encoding {
            credential_id: data.id.clone(),
            source,
        })?;

        let anchored = self
            .ledger
            .verify_anchor(&self.contract, &fp.canonical, &self.account)
            .await
            .map_err(|source| VerifyError::Query {
                credential_id: data.id.clone(),
                source,
            })?;

        let verdict = if anchored {
            Verdict::Valid
        } else {
            Verdict::Invalid
        };
        tracing::info!(
            credential_id = %data.id,
            digest = %fp.digest,
            verdict = ?verdict,
            "credential verified"
        );
        Ok(verdict)
    }

    /// Verify items in order. The first error stops the run; invalid items
    /// only mark the aggregate response.
    pub async fn verify_all<'a, I>(&self, items: I) -> Result<VerifyResponse, VerifyError>
    where
        I: IntoIterator<Item = &'a CredentialData>,
    {
        let mut response = VerifyResponse::ok();
        for data in items {
            if self.verify(data).await? == Verdict::Invalid {
                response.record_invalid();
            }
        }
        Ok(response)
    }
}
