//! `radar status`: what the store currently holds.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use radar_core::{OrganizationName, Repository};
use radar_store::{organizations, repositories};

/// Arguments for `radar status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Config file (default `~/.octoradar/config.yaml`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only show one organization.
    #[arg(long)]
    pub organization: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config(self.config.as_deref())?;
        let store = super::open_store(&config)?;

        let organization_count = organizations::find_all(&store)
            .context("failed to read organizations")?
            .len();
        let repos = match self.organization.as_deref() {
            Some(name) => repositories::find_by_organization(&store, &OrganizationName::from(name)),
            None => repositories::find_all(&store),
        }
        .context("failed to read repositories")?;

        let rows = build_rows(repos);
        if self.json {
            let payload = StatusJson {
                organizations: organization_count,
                repositories: rows,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(organization_count, rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct RepositoryStatus {
    organization: String,
    repository: String,
    archived: bool,
    latest_size_kb: Option<u64>,
    samples: usize,
    last_synced_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StatusJson {
    organizations: usize,
    repositories: Vec<RepositoryStatus>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "repository")]
    repository: String,
    #[tabled(rename = "size (KB)")]
    size: String,
    #[tabled(rename = "samples")]
    samples: usize,
    #[tabled(rename = "last sync")]
    last_sync: String,
}

fn build_rows(repos: Vec<Repository>) -> Vec<RepositoryStatus> {
    let mut rows: Vec<RepositoryStatus> = repos
        .into_iter()
        .map(|repo| RepositoryStatus {
            latest_size_kb: repo.latest_sample().map(|sample| sample.size),
            samples: repo.size_history.len(),
            organization: repo.organization.0,
            repository: repo.name.0,
            archived: repo.archived,
            last_synced_at: repo.last_synced_at,
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.organization.as_str(), a.repository.as_str())
            .cmp(&(b.organization.as_str(), b.repository.as_str()))
    });
    rows
}

fn print_table(organization_count: usize, rows: Vec<RepositoryStatus>) {
    println!(
        "octoradar v{} | {} organizations | {} repositories",
        env!("CARGO_PKG_VERSION"),
        organization_count,
        rows.len(),
    );
    if rows.is_empty() {
        println!("No repositories stored. Run 'radar sync' first.");
        return;
    }

    let mut grouped = BTreeMap::<String, Vec<RepositoryStatus>>::new();
    for row in rows {
        grouped.entry(row.organization.clone()).or_default().push(row);
    }
    for (organization, rows) in grouped {
        println!("{}", organization.bold());
        let table_rows: Vec<StatusTableRow> = rows
            .into_iter()
            .map(|row| StatusTableRow {
                repository: if row.archived {
                    format!("{} {}", row.repository, "(archived)".bright_black())
                } else {
                    row.repository
                },
                size: row
                    .latest_size_kb
                    .map(|size| size.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                samples: row.samples,
                last_sync: row.last_synced_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            })
            .collect();
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use radar_core::SizeSample;

    fn repo(org: &str, name: &str, samples: &[(u64, i64)]) -> Repository {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Repository {
            name: name.into(),
            organization: org.into(),
            created_at: t0,
            latest_commit_at: None,
            archived: false,
            disabled: false,
            open_issues: 0,
            has_issues: true,
            url: format!("https://github.com/{org}/{name}"),
            default_branch: None,
            main_language: None,
            languages: None,
            contributors: None,
            last_synced_at: t0,
            size_history: samples
                .iter()
                .map(|&(size, days)| SizeSample {
                    size,
                    timestamp: t0 + chrono::Duration::days(days),
                })
                .collect(),
        }
    }

    #[test]
    fn rows_are_sorted_and_report_latest_sample() {
        let rows = build_rows(vec![
            repo("zeta", "b", &[]),
            repo("acme", "radar", &[(100, 0), (250, 8)]),
        ]);
        assert_eq!(rows[0].organization, "acme");
        assert_eq!(rows[0].latest_size_kb, Some(250));
        assert_eq!(rows[0].samples, 2);
        assert_eq!(rows[1].latest_size_kb, None);
    }
}
