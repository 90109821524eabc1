//! Notarium CLI: Anchor and verify credentials from the command line.
//!
//! Subcommands: init, fingerprint, anchor, verify.

mod commands;
mod config;
mod ledger;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{LoggingConfig, NotariumConfig};

/// Notarium: Ledger-anchored verifiable credentials.
#[derive(Parser, Debug)]
#[command(name = "notarium", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "notarium.toml")]
    config: PathBuf,

    /// Override the ledger endpoint.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Print the canonical form and digest of credentials.
    Fingerprint(commands::fingerprint::FingerprintArgs),
    /// Anchor a batch of credential subjects.
    Anchor(commands::anchor::AnchorArgs),
    /// Verify credentials against the ledger.
    Verify(commands::verify::VerifyArgs),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = NotariumConfig::load(&cli.config)?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.ledger.endpoint = endpoint.clone();
    }
    init_tracing(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Fingerprint(args) => commands::fingerprint::run(args),
        Commands::Anchor(args) => commands::anchor::run(args, &config).await,
        Commands::Verify(args) => {
            if !commands::verify::run(args, &config).await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
