//! `notarium init`: Write a default configuration file.

use clap::Args;
use std::path::Path;

use crate::config::NotariumConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    let config = NotariumConfig::default();
    config.save(config_path)?;
    println!("Wrote default configuration to {}", config_path.display());
    println!(
        "Set {} to the issuer's hex signing key before anchoring.",
        config.issuer.private_key_env
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notarium.toml");
        run(&InitArgs { force: false }, &path).unwrap();
        assert!(run(&InitArgs { force: false }, &path).is_err());
        run(&InitArgs { force: true }, &path).unwrap();
        assert!(NotariumConfig::load(&path).is_ok());
    }
}
