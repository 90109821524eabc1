//! `notarium anchor`: Anchor a batch of credential subjects.

use anyhow::Context;
use clap::Args;
use notarium_anchor::{cancel_pair, AnchorOutcome, AnchorParams, BatchOrchestrator};
use notarium_core::{Credential, CredentialSubject};
use std::path::PathBuf;

use super::{contract, dispatcher, private_key, read_json_list};
use crate::config::NotariumConfig;
use crate::ledger::LocalLedger;

#[derive(Args, Debug)]
pub struct AnchorArgs {
    /// JSON file with one subject or an array of subjects.
    pub subjects: PathBuf,

    /// Where to write the anchored credentials.
    #[arg(short, long, default_value = "credentials.json")]
    pub out: PathBuf,

    /// Override the number of items anchored at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Skip notifications even when enabled in the configuration.
    #[arg(long)]
    pub no_notify: bool,
}

pub async fn run(args: &AnchorArgs, config: &NotariumConfig) -> anyhow::Result<()> {
    let subjects: Vec<CredentialSubject> = read_json_list(&args.subjects)?;

    let params = AnchorParams {
        endpoint: config.ledger.endpoint.clone(),
        issuer: config.issuer.did.clone(),
        contract: contract(config)?,
        private_key: private_key(config)?,
    };

    let mut anchoring = config.anchoring.clone();
    if let Some(concurrency) = args.concurrency {
        anchoring.concurrency = concurrency;
    }

    let ledger = LocalLedger::open(&config.ledger)?;
    let mut orchestrator = BatchOrchestrator::new(ledger.connector(), anchoring);
    if !args.no_notify {
        if let Some(dispatcher) = dispatcher(config) {
            orchestrator = orchestrator.with_notifier(dispatcher);
        }
    }

    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling pending confirmations");
            handle.cancel();
        }
    });

    let outcomes = orchestrator.anchor_batch(&subjects, &params, signal).await?;
    ledger.persist()?;

    let mut credentials: Vec<Credential> = Vec::new();
    for (i, outcome) in outcomes.into_iter().enumerate() {
        match &outcome {
            AnchorOutcome::Anchored(credential) => {
                let block = credential
                    .metadata
                    .as_ref()
                    .map(|m| m.block_number.as_str())
                    .unwrap_or("-");
                println!(
                    "[{:>3}] {}  {}  block {}",
                    i + 1,
                    outcome.state(),
                    credential.id(),
                    block
                );
            }
            AnchorOutcome::Failed(failure) => {
                let id = failure
                    .credential
                    .as_ref()
                    .map(|c| c.id().to_string())
                    .unwrap_or_else(|| "-".into());
                println!("[{:>3}] {}  {}  {}", i + 1, failure.state, id, failure.error);
            }
        }
        if let AnchorOutcome::Anchored(credential) = outcome {
            credentials.push(credential);
        }
    }

    std::fs::write(&args.out, serde_json::to_vec_pretty(&credentials)?)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!(
        "{} of {} credentials anchored, written to {}",
        credentials.len(),
        subjects.len(),
        args.out.display()
    );
    Ok(())
}
