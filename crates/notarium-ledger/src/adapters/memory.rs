use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use notarium_core::Digest;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::LedgerError;
use crate::traits::{Ledger, LedgerConnector};
use crate::types::{Address, Receipt, SigningContext, TxRef};

/// An anchor stored by the contract once its transaction is mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub contract: Address,
    pub digest: Digest,
    pub signer: Address,
    pub expiration_epoch: i64,
    pub tx: TxRef,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

/// Serializable ledger state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub block_height: u64,
    pub anchors: Vec<AnchorRecord>,
}

/// A submitted transaction awaiting inclusion.
#[derive(Debug, Clone)]
struct PendingTx {
    contract: Address,
    digest: Digest,
    signer: Address,
    expiration_epoch: i64,
    polls: u32,
    stalled: bool,
}

/// In-process ledger with an anchoring contract.
///
/// Transactions are mined after a configurable number of receipt polls.
/// Faults can be injected per item to exercise failure handling: rejected
/// submissions and never-mined transactions are selected by expiration
/// epoch, failing verification queries by a marker in the canonical bytes.
pub struct MemoryLedger {
    anchors: DashMap<(Address, Digest), AnchorRecord>,
    pending: DashMap<TxRef, PendingTx>,
    receipts: DashMap<TxRef, Receipt>,
    block_height: AtomicU64,
    nonce: AtomicU64,
    polls_until_mined: u32,
    rejected_expirations: DashSet<i64>,
    stalled_expirations: DashSet<i64>,
    failing_query_markers: DashSet<String>,
}

impl MemoryLedger {
    /// Create an empty ledger that mines on the first receipt poll.
    pub fn new() -> Self {
        Self {
            anchors: DashMap::new(),
            pending: DashMap::new(),
            receipts: DashMap::new(),
            block_height: AtomicU64::new(0),
            nonce: AtomicU64::new(0),
            polls_until_mined: 0,
            rejected_expirations: DashSet::new(),
            stalled_expirations: DashSet::new(),
            failing_query_markers: DashSet::new(),
        }
    }

    /// Require `polls` unsuccessful receipt polls before a transaction mines.
    pub fn with_confirmation_polls(mut self, polls: u32) -> Self {
        self.polls_until_mined = polls;
        self
    }

    /// Restore a ledger from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let ledger = Self::new();
        ledger
            .block_height
            .store(snapshot.block_height, Ordering::SeqCst);
        for record in snapshot.anchors {
            ledger
                .anchors
                .insert((record.contract.clone(), record.digest), record);
        }
        ledger
    }

    /// Capture the mined anchors and block height.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut anchors: Vec<AnchorRecord> =
            self.anchors.iter().map(|e| e.value().clone()).collect();
        anchors.sort_by_key(|r| r.block_number);
        LedgerSnapshot {
            block_height: self.block_height.load(Ordering::SeqCst),
            anchors,
        }
    }

    /// Reject every submission carrying this expiration epoch.
    pub fn reject_submissions_expiring_at(&self, epoch: i64) {
        self.rejected_expirations.insert(epoch);
    }

    /// Never mine transactions carrying this expiration epoch.
    pub fn stall_transactions_expiring_at(&self, epoch: i64) {
        self.stalled_expirations.insert(epoch);
    }

    /// Fail verification queries whose canonical bytes contain `marker`.
    pub fn fail_queries_containing(&self, marker: impl Into<String>) {
        self.failing_query_markers.insert(marker.into());
    }

    /// Look up a mined anchor.
    pub fn anchor(&self, contract: &Address, digest: &Digest) -> Option<AnchorRecord> {
        self.anchors
            .get(&(contract.clone(), *digest))
            .map(|r| r.value().clone())
    }

    /// Number of mined anchors.
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Submissions accepted so far, mined or not.
    pub fn submission_count(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Transactions submitted but not yet mined.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Current block height.
    pub fn block_height(&self) -> u64 {
        self.block_height.load(Ordering::SeqCst)
    }

    fn tx_hash(&self, contract: &Address, signer: &Address, digest: &Digest) -> TxRef {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(contract.as_str().as_bytes());
        hasher.update(signer.as_str().as_bytes());
        hasher.update(digest.as_bytes());
        hasher.update(nonce.to_be_bytes());
        TxRef::from_hash(hasher.finalize().into())
    }

    fn submit(
        &self,
        contract: &Address,
        context: &SigningContext,
        digest: &Digest,
        expiration_epoch: i64,
    ) -> Result<TxRef, LedgerError> {
        if self.rejected_expirations.contains(&expiration_epoch) {
            return Err(LedgerError::Submission(format!(
                "contract {} reverted anchor {}",
                contract, digest
            )));
        }
        let tx = self.tx_hash(contract, context.account(), digest);
        self.pending.insert(
            tx.clone(),
            PendingTx {
                contract: contract.clone(),
                digest: *digest,
                signer: context.account().clone(),
                expiration_epoch,
                polls: 0,
                stalled: self.stalled_expirations.contains(&expiration_epoch),
            },
        );
        tracing::debug!(%tx, %digest, "memory ledger accepted anchor transaction");
        Ok(tx)
    }

    fn poll_receipt(&self, tx: &TxRef) -> Result<Receipt, LedgerError> {
        if let Some(receipt) = self.receipts.get(tx) {
            return Ok(receipt.clone());
        }

        let record = {
            let mut entry = self
                .pending
                .get_mut(tx)
                .ok_or_else(|| LedgerError::Query(format!("unknown transaction {}", tx)))?;
            let pending = entry.value_mut();
            if pending.stalled {
                return Err(LedgerError::NotYetMined(tx.clone()));
            }
            pending.polls += 1;
            if pending.polls <= self.polls_until_mined {
                return Err(LedgerError::NotYetMined(tx.clone()));
            }
            AnchorRecord {
                contract: pending.contract.clone(),
                digest: pending.digest,
                signer: pending.signer.clone(),
                expiration_epoch: pending.expiration_epoch,
                tx: tx.clone(),
                block_number: 0,
                timestamp: Utc::now(),
            }
        };

        // Mined: the receipt cache answers from here on.
        if self.pending.remove(tx).is_none() {
            // A concurrent poll mined it first.
            return self
                .receipts
                .get(tx)
                .map(|r| r.clone())
                .ok_or_else(|| LedgerError::NotYetMined(tx.clone()));
        }
        let block_number = self.block_height.fetch_add(1, Ordering::SeqCst) + 1;
        let receipt = Receipt {
            tx: tx.clone(),
            block_number,
            timestamp: record.timestamp,
        };
        self.receipts.insert(tx.clone(), receipt.clone());
        self.anchors
            .entry((record.contract.clone(), record.digest))
            .or_insert(AnchorRecord {
                block_number,
                ..record
            });
        tracing::debug!(%tx, block = block_number, "memory ledger mined transaction");
        Ok(receipt)
    }

    fn query(
        &self,
        contract: &Address,
        canonical: &[u8],
        account: &Address,
    ) -> Result<bool, LedgerError> {
        let text = String::from_utf8_lossy(canonical);
        if self
            .failing_query_markers
            .iter()
            .any(|m| text.contains(m.key().as_str()))
        {
            return Err(LedgerError::Query("node did not answer the call".into()));
        }
        let digest = Digest::of(canonical);
        Ok(self
            .anchors
            .get(&(contract.clone(), digest))
            .map(|record| &record.signer == account)
            .unwrap_or(false))
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out connections to a shared [`MemoryLedger`].
pub struct MemoryConnector {
    ledger: Arc<MemoryLedger>,
    reachable: AtomicBool,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(ledger: Arc<MemoryLedger>) -> Self {
        Self {
            ledger,
            reachable: AtomicBool::new(true),
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate the node going up or down.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Shared ledger state.
    pub fn ledger(&self) -> &Arc<MemoryLedger> {
        &self.ledger
    }

    /// Number of successful connects so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of connections closed so far.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerConnector for MemoryConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn Ledger>, LedgerError> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(LedgerError::Connection(format!(
                "no route to {}",
                endpoint
            )));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(endpoint, "memory ledger connection opened");
        Ok(Arc::new(MemoryConnection {
            ledger: Arc::clone(&self.ledger),
            closed: AtomicBool::new(false),
            closes: Arc::clone(&self.closes),
        }))
    }
}

/// One open connection to a [`MemoryLedger`].
struct MemoryConnection {
    ledger: Arc<MemoryLedger>,
    closed: AtomicBool,
    closes: Arc<AtomicUsize>,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(LedgerError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Ledger for MemoryConnection {
    fn ledger_id(&self) -> &str {
        "memory"
    }

    fn signing_context(&self, private_key: &str) -> Result<SigningContext, LedgerError> {
        SigningContext::from_hex_key(private_key)
    }

    async fn submit_anchor(
        &self,
        contract: &Address,
        context: &SigningContext,
        digest: &Digest,
        expiration_epoch: i64,
    ) -> Result<TxRef, LedgerError> {
        self.ensure_open()?;
        self.ledger
            .submit(contract, context, digest, expiration_epoch)
    }

    async fn receipt(&self, tx: &TxRef) -> Result<Receipt, LedgerError> {
        self.ensure_open()?;
        self.ledger.poll_receipt(tx)
    }

    async fn verify_anchor(
        &self,
        contract: &Address,
        canonical: &[u8],
        account: &Address,
    ) -> Result<bool, LedgerError> {
        self.ensure_open()?;
        self.ledger.query(contract, canonical, account)
    }

    async fn close(&self) -> Result<(), LedgerError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("memory ledger connection closed");
        }
        Ok(())
    }
}
