//! `notarium verify`: Verify credentials against the ledger.

use anyhow::Context;
use clap::Args;
use notarium_anchor::{BatchOrchestrator, VerifyParams};
use notarium_core::{Credential, CredentialDocument, VerifyResponse};
use notarium_ledger::{Address, SigningContext};
use std::path::PathBuf;

use super::{contract, dispatcher, private_key, read_json_list};
use crate::config::NotariumConfig;
use crate::ledger::LocalLedger;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// JSON file with one credential or an array of credentials.
    pub credentials: PathBuf,

    /// Account the credentials were anchored by. Defaults to the account of
    /// the configured signing key.
    #[arg(long)]
    pub account: Option<String>,

    /// Send each valid credential to its recipient again.
    #[arg(long)]
    pub notify: bool,
}

pub async fn run(args: &VerifyArgs, config: &NotariumConfig) -> anyhow::Result<bool> {
    let account = match &args.account {
        Some(raw) => Address::parse(raw).with_context(|| format!("invalid account {:?}", raw))?,
        None => {
            let key = private_key(config).context("pass --account or set the issuer key")?;
            SigningContext::from_hex_key(&key)?.account().clone()
        }
    };
    let params = VerifyParams {
        endpoint: config.ledger.endpoint.clone(),
        contract: contract(config)?,
        account,
    };

    let ledger = LocalLedger::open(&config.ledger)?;
    let mut orchestrator = BatchOrchestrator::new(ledger.connector(), config.anchoring.clone());

    let response: VerifyResponse = if args.notify {
        let credentials: Vec<Credential> = read_json_list(&args.credentials)?;
        let dispatcher =
            dispatcher(config).context("--notify requires [notification] enabled = true")?;
        orchestrator = orchestrator.with_notifier(dispatcher);
        orchestrator.verify_and_notify(&credentials, &params).await?
    } else {
        let documents: Vec<CredentialDocument> = read_json_list(&args.credentials)?;
        orchestrator.verify_batch(&documents, &params).await?
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.valid)
}
