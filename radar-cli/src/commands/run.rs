//! `radar run`: the long-running daemon.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use radar_daemon::StopReason;

/// Arguments for `radar run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (default `~/.octoradar/config.yaml`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop after this many passes instead of running until interrupted.
    #[arg(long)]
    pub max_passes: Option<u64>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config(self.config.as_deref())?;
        let stop = radar_daemon::start_blocking(&config, self.max_passes)
            .context("daemon stopped with an error")?;
        match stop {
            StopReason::FailureThreshold { failures } => {
                println!("radar stopped after {failures} consecutive failed pass(es).")
            }
            StopReason::Interrupted => println!("radar stopped."),
            StopReason::MaxPasses { passes } => println!("radar finished {passes} pass(es)."),
        }
        Ok(())
    }
}
