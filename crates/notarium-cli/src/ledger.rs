//! Development ledger persisted between CLI runs.

use anyhow::Context;
use notarium_ledger::{LedgerSnapshot, MemoryConnector, MemoryLedger};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LedgerConfig;

const MEMORY_SCHEME: &str = "memory://";

/// A `memory://` ledger backed by a JSON state file.
pub struct LocalLedger {
    connector: Arc<MemoryConnector>,
    state_path: PathBuf,
}

impl LocalLedger {
    /// Open the ledger named by `config`, restoring any saved state.
    pub fn open(config: &LedgerConfig) -> anyhow::Result<Self> {
        if !config.endpoint.starts_with(MEMORY_SCHEME) {
            anyhow::bail!(
                "unsupported ledger endpoint {:?}: only {} endpoints are available",
                config.endpoint,
                MEMORY_SCHEME
            );
        }
        let ledger = load_state(&config.state_path)?;
        tracing::debug!(
            path = %config.state_path.display(),
            anchors = ledger.anchor_count(),
            "development ledger opened"
        );
        Ok(Self {
            connector: Arc::new(MemoryConnector::new(Arc::new(ledger))),
            state_path: config.state_path.clone(),
        })
    }

    pub fn connector(&self) -> Arc<MemoryConnector> {
        Arc::clone(&self.connector)
    }

    /// Write the mined anchors back to the state file.
    pub fn persist(&self) -> anyhow::Result<()> {
        let snapshot = self.connector.ledger().snapshot();
        if let Some(parent) = self.state_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.state_path, serde_json::to_vec_pretty(&snapshot)?)
            .with_context(|| format!("writing {}", self.state_path.display()))?;
        tracing::debug!(
            path = %self.state_path.display(),
            anchors = snapshot.anchors.len(),
            "development ledger saved"
        );
        Ok(())
    }
}

fn load_state(path: &Path) -> anyhow::Result<MemoryLedger> {
    if !path.exists() {
        return Ok(MemoryLedger::new());
    }
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot: LedgerSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing ledger state {}", path.display()))?;
    Ok(MemoryLedger::from_snapshot(snapshot))
}
