//! `radar sync`: one reconciliation pass, in the foreground.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use radar_remote::GithubClient;
use radar_store::{organizations, repositories, DocumentStore, MemoryStore};
use radar_sync::{PassReport, Reconciler, SyncSettings, SystemClock};

/// Arguments for `radar sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Config file (default `~/.octoradar/config.yaml`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reconcile against an in-memory copy of the store and discard it.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config(self.config.as_deref())?;
        radar_daemon::init_tracing(&config.log);

        let store = super::open_store(&config)?;
        let remote = GithubClient::from_config(&config.github);
        let settings = SyncSettings::from_config(&config.daemon);

        let report = if self.dry_run {
            let copy = MemoryStore::copy_from(
                &store,
                &[organizations::COLLECTION, repositories::COLLECTION],
            )
            .context("failed to copy the store for a dry run")?;
            run_pass(remote, copy, settings)?
        } else {
            run_pass(remote, store, settings)?
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
            return Ok(());
        }
        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn run_pass<S: DocumentStore>(
    remote: GithubClient,
    store: S,
    settings: SyncSettings,
) -> Result<PassReport> {
    Reconciler::new(remote, store, SystemClock, settings)
        .run_pass()
        .context("reconciliation pass failed")
}

fn print_report(report: &PassReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} {} organization(s) reconciled",
        "✓".green().bold(),
        report.organizations,
    );
    println!(
        "  organizations: {} inserted, {} deleted, {} skipped",
        report.organizations_inserted, report.organizations_deleted, report.organizations_skipped,
    );
    println!(
        "  repositories:  {} inserted, {} updated, {} pruned",
        report.repositories_inserted, report.repositories_updated, report.repositories_pruned,
    );
    println!("  size samples:  {} appended", report.samples_appended);
    if report.enrichment_fallbacks > 0 {
        println!(
            "  {} {} language/contributor lookup(s) failed and were stored empty",
            "!".yellow().bold(),
            report.enrichment_fallbacks,
        );
    }
}
