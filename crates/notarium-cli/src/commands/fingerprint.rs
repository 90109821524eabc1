//! `notarium fingerprint`: Print the canonical form and digest of credentials.

use clap::Args;
use notarium_core::{fingerprint, CredentialDocument};
use std::path::PathBuf;

use super::read_json_list;

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// JSON file with one credential or an array of credentials.
    pub path: PathBuf,

    /// Print only the digests.
    #[arg(long)]
    pub digest_only: bool,
}

pub fn run(args: &FingerprintArgs) -> anyhow::Result<()> {
    let documents: Vec<CredentialDocument> = read_json_list(&args.path)?;
    for document in &documents {
        let data = document.data();
        let fp = fingerprint(data)?;
        if args.digest_only {
            println!("{}", fp.digest);
        } else {
            println!("id:        {}", data.id);
            println!("digest:    {}", fp.digest);
            println!("canonical: {}", String::from_utf8_lossy(&fp.canonical));
            println!();
        }
    }
    Ok(())
}
