//! octoradar: mirror GitHub organization and repository metadata.
//!
//! # Usage
//!
//! ```text
//! radar run [--config <path>] [--max-passes <n>]
//! radar sync [--config <path>] [--dry-run] [--json]
//! radar status [--config <path>] [--organization <name>] [--json]
//! radar config check [--config <path>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, run::RunArgs, status::StatusArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "radar",
    version,
    about = "Mirror GitHub organizations and repositories into a local store",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run reconciliation passes on a fixed interval until stopped.
    Run(RunArgs),

    /// Run a single reconciliation pass and print what it did.
    Sync(SyncArgs),

    /// Show the stored repositories and their latest size.
    Status(StatusArgs),

    /// Inspect the configuration file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
