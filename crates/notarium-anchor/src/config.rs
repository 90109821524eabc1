use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Floor for every polling delay; a zero delay would never grow.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Receipt polling bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay before the second receipt query.
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    /// Upper bound for a single delay.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    /// Growth factor applied to the delay after each miss.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Overall wait for a receipt, measured from submission.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_initial_interval_ms() -> u64 {
    500
}
fn default_max_interval_ms() -> u64 {
    4_000
}
fn default_multiplier() -> f64 {
    2.0
}
fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PollConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
            .max(MIN_INTERVAL)
            .min(self.max_interval())
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms).max(MIN_INTERVAL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The delay that follows `current`, grown by the multiplier and capped.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let factor = if self.multiplier.is_finite() {
            self.multiplier.clamp(1.0, 16.0)
        } else {
            1.0
        };
        current
            .max(MIN_INTERVAL)
            .mul_f64(factor)
            .min(self.max_interval())
    }
}

/// Anchoring behavior shared by every item of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchoringConfig {
    /// Items in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Proof type tag written into each credential.
    #[serde(default = "default_proof_type")]
    pub proof_type: String,
    #[serde(default)]
    pub poll: PollConfig,
}

fn default_concurrency() -> usize {
    4
}
fn default_proof_type() -> String {
    "SmartContract".into()
}

impl Default for AnchoringConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            proof_type: default_proof_type(),
            poll: PollConfig::default(),
        }
    }
}
