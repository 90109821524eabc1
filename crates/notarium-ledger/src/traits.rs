use async_trait::async_trait;
use notarium_core::Digest;
use std::sync::Arc;

use crate::error::LedgerError;
use crate::types::{Address, Receipt, SigningContext, TxRef};

/// Opens ledger connections.
///
/// One connection is acquired per batch and shared by every item in it.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Connect to the ledger at `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn Ledger>, LedgerError>;
}

/// An open ledger connection.
///
/// Implementations must tolerate concurrent calls; the batch orchestrator
/// shares one handle across its workers.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Short identifier of the backend (e.g. "memory").
    fn ledger_id(&self) -> &str;

    /// Derive a signing context from a hex private key.
    fn signing_context(&self, private_key: &str) -> Result<SigningContext, LedgerError>;

    /// Submit a transaction anchoring `digest` on `contract`, valid until
    /// `expiration_epoch` (Unix seconds).
    async fn submit_anchor(
        &self,
        contract: &Address,
        context: &SigningContext,
        digest: &Digest,
        expiration_epoch: i64,
    ) -> Result<TxRef, LedgerError>;

    /// Fetch the receipt of a submitted transaction.
    ///
    /// Returns [`LedgerError::NotYetMined`] while the transaction is pending.
    async fn receipt(&self, tx: &TxRef) -> Result<Receipt, LedgerError>;

    /// Ask the contract whether `canonical` was anchored by `account`.
    async fn verify_anchor(
        &self,
        contract: &Address,
        canonical: &[u8],
        account: &Address,
    ) -> Result<bool, LedgerError>;

    /// Release the connection.
    async fn close(&self) -> Result<(), LedgerError>;
}
