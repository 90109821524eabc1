pub mod anchor;
pub mod fingerprint;
pub mod init;
pub mod verify;

use anyhow::Context;
use notarium_ledger::Address;
use notarium_notify::{LogMailer, Mailer, NotificationDispatcher, OutboxMailer};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::config::NotariumConfig;

/// Read a JSON file that holds either one value or an array of values.
pub(crate) fn read_json_list<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .with_context(|| format!("{}: item {} is malformed", path.display(), i + 1))
        })
        .collect()
}

/// Read the issuer key from the environment variable named in the config.
pub(crate) fn private_key(config: &NotariumConfig) -> anyhow::Result<Zeroizing<String>> {
    let key_env = &config.issuer.private_key_env;
    let key = std::env::var(key_env).with_context(|| format!("{} is not set", key_env))?;
    Ok(Zeroizing::new(key))
}

pub(crate) fn contract(config: &NotariumConfig) -> anyhow::Result<Address> {
    Address::parse(&config.issuer.verification_contract).with_context(|| {
        format!(
            "invalid verification contract {:?}",
            config.issuer.verification_contract
        )
    })
}

/// Build the notification dispatcher when notifications are enabled.
pub(crate) fn dispatcher(config: &NotariumConfig) -> Option<Arc<NotificationDispatcher>> {
    let section = &config.notification;
    if !section.enabled {
        return None;
    }
    let mailer: Arc<dyn Mailer> = match &section.outbox_dir {
        Some(dir) => Arc::new(OutboxMailer::new(dir)),
        None => Arc::new(LogMailer),
    };
    Some(Arc::new(NotificationDispatcher::new(
        mailer,
        section.message.clone(),
    )))
}
