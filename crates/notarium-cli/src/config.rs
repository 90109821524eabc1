//! CLI configuration loading and management.

use notarium_anchor::AnchoringConfig;
use notarium_notify::NotificationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full configuration for the `notarium` binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotariumConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub issuer: IssuerConfig,

    #[serde(default)]
    pub anchoring: AnchoringConfig,

    #[serde(default)]
    pub notification: NotificationSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger endpoint. Only `memory://` is available in this build.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Where the development ledger keeps its state between runs.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Issuer identity written into every credential.
    #[serde(default = "default_did")]
    pub did: String,
    /// Contract the anchors are recorded on.
    #[serde(default = "default_contract")]
    pub verification_contract: String,
    /// Environment variable holding the hex signing key.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSection {
    /// Whether recipients are notified.
    #[serde(default)]
    pub enabled: bool,
    /// Directory for outgoing messages; messages are only logged when unset.
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub message: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_endpoint() -> String {
    "memory://local".into()
}
fn default_state_path() -> PathBuf {
    PathBuf::from("./notarium-ledger.json")
}
fn default_did() -> String {
    "did:example:issuer".into()
}
fn default_contract() -> String {
    "0x5fbdb2315678afecb367f032d93f642f64180aa3".into()
}
fn default_private_key_env() -> String {
    "NOTARIUM_PRIVATE_KEY".into()
}
fn default_outbox_dir() -> Option<PathBuf> {
    Some(PathBuf::from("./outbox"))
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            state_path: default_state_path(),
        }
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            did: default_did(),
            verification_contract: default_contract(),
            private_key_env: default_private_key_env(),
        }
    }
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            enabled: false,
            outbox_dir: default_outbox_dir(),
            message: NotificationConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl NotariumConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: NotariumConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NotariumConfig::default();
        assert_eq!(config.ledger.endpoint, "memory://local");
        assert_eq!(config.issuer.private_key_env, "NOTARIUM_PRIVATE_KEY");
        assert_eq!(config.anchoring.concurrency, 4);
        assert_eq!(config.anchoring.poll.timeout_ms, 60_000);
        assert!(!config.notification.enabled);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = NotariumConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: NotariumConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.issuer.did, config.issuer.did);
        assert_eq!(decoded.anchoring, config.anchoring);
        assert_eq!(
            decoded.notification.message.verification_base_url,
            config.notification.message.verification_base_url
        );
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = NotariumConfig::load(Path::new("/nonexistent/notarium.toml")).unwrap();
        assert_eq!(config.ledger.endpoint, "memory://local");
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[issuer]
did = "did:example:university"

[anchoring.poll]
timeout_ms = 5000

[notification]
enabled = true
sender = "registrar@example.edu"
"#;
        let config: NotariumConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.issuer.did, "did:example:university");
        assert_eq!(config.anchoring.poll.timeout_ms, 5000);
        assert_eq!(config.anchoring.poll.initial_interval_ms, 500);
        assert!(config.notification.enabled);
        assert_eq!(config.notification.message.sender, "registrar@example.edu");
        assert_eq!(config.notification.message.organization, "Notarium");
        assert_eq!(
            config.notification.outbox_dir.as_deref(),
            Some(Path::new("./outbox"))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/notarium.toml");
        let mut config = NotariumConfig::default();
        config.notification.message.support_contact = Some("help@example.org".into());
        config.save(&path).unwrap();

        let loaded = NotariumConfig::load(&path).unwrap();
        assert_eq!(
            loaded.notification.message.support_contact.as_deref(),
            Some("help@example.org")
        );
    }
}
