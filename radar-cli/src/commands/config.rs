//! `radar config`: configuration inspection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate the config, then print the effective values.
    Check {
        /// Config file (default `~/.octoradar/config.yaml`).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Check { config } => check(config),
    }
}

fn check(explicit: Option<PathBuf>) -> Result<()> {
    let path = super::config_path(explicit.as_deref())?;
    let config = super::load_config(Some(&path))?;
    let yaml = config
        .redacted()
        .to_yaml()
        .context("failed to render config")?;
    println!("{} {} is valid", "✓".green().bold(), path.display());
    print!("{yaml}");
    Ok(())
}
