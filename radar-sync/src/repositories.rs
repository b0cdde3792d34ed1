//! Repository step: refresh every repository document of one organization.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use radar_core::{
    Contributor, OrganizationName, Repository, RepositoryName, RepositoryPrunePolicy, SizeSample,
};
use radar_remote::{LanguageBreakdown, RemoteContributor, RemoteRepository, RemoteSource};
use radar_store::{repositories as stored_repos, DocumentStore};

use crate::clock::Clock;
use crate::engine::{percent, Disposition, PassState};
use crate::error::{classify_write, ReconcileError, SyncError};
use crate::history::merge_size_history;
use crate::settings::SyncSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Inserted,
    Updated { sample_appended: bool },
}

/// Refresh all repositories of `organization`.
///
/// A failed repository-list fetch skips the organization without failing
/// the pass.
pub(crate) fn reconcile_organization<R, S, C>(
    remote: &R,
    store: &mut S,
    clock: &C,
    settings: &SyncSettings,
    organization: &OrganizationName,
    state: &mut PassState,
) -> Result<(), SyncError>
where
    R: RemoteSource,
    S: DocumentStore,
    C: Clock,
{
    let repos = match remote.list_organization_repositories(&organization.0) {
        Ok(repos) => repos,
        Err(err) => {
            tracing::error!(
                organization = %organization,
                error = %err,
                "error while retrieving repositories, skipping organization",
            );
            state.report.organizations_skipped += 1;
            return Ok(());
        }
    };
    tracing::info!(
        organization = %organization,
        count = repos.len(),
        "found repositories",
    );

    let failures_before = state.failures.len();
    for (index, repo) in repos.iter().enumerate() {
        tracing::debug!(
            organization = %organization,
            repository = %repo.name,
            completed = %format!("{}%", percent(index + 1, repos.len())),
            "fetching repository info",
        );
        let (document, sample) = fetch_document(remote, clock, organization, repo, state);
        match write_document(store, settings, document, sample) {
            Ok(WriteOutcome::Inserted) => state.report.repositories_inserted += 1,
            Ok(WriteOutcome::Updated { sample_appended }) => {
                state.report.repositories_updated += 1;
                if sample_appended {
                    state.report.samples_appended += 1;
                }
            }
            Err(SyncError::Reconcile(err)) => {
                match state.record_failure(err, settings.batch_failure_policy)? {
                    Disposition::Continue => {}
                    Disposition::SkipOrganization => break,
                }
            }
            Err(other) => return Err(other),
        }
    }

    if settings.repository_prune_policy == RepositoryPrunePolicy::RemoveMissing
        && state.failures.len() == failures_before
    {
        prune_missing(store, organization, &repos, state)?;
    }
    Ok(())
}

/// Fetch the enrichment data and build the full document. Lookup failures
/// degrade to absent data.
fn fetch_document<R: RemoteSource, C: Clock>(
    remote: &R,
    clock: &C,
    organization: &OrganizationName,
    repo: &RemoteRepository,
    state: &mut PassState,
) -> (Repository, SizeSample) {
    let languages = match remote.get_repository_languages(&organization.0, &repo.name) {
        Ok(languages) => languages,
        Err(err) => {
            tracing::warn!(
                organization = %organization,
                repository = %repo.name,
                error = %err,
                "error while retrieving languages",
            );
            state.report.enrichment_fallbacks += 1;
            None
        }
    };
    let contributors = match remote.get_repository_contributors(&organization.0, &repo.name) {
        Ok(contributors) => contributors,
        Err(err) => {
            tracing::warn!(
                organization = %organization,
                repository = %repo.name,
                error = %err,
                "error while retrieving contributors",
            );
            state.report.enrichment_fallbacks += 1;
            None
        }
    };

    let now = clock.now();
    let document = document_from_remote(organization, repo, languages, contributors, now);
    let sample = SizeSample {
        size: repo.size,
        timestamp: now,
    };
    (document, sample)
}

/// Build the document for a freshly fetched repository; its size history is
/// the single sample observed at `now`.
pub(crate) fn document_from_remote(
    organization: &OrganizationName,
    repo: &RemoteRepository,
    languages: Option<LanguageBreakdown>,
    contributors: Option<Vec<RemoteContributor>>,
    now: DateTime<Utc>,
) -> Repository {
    let contributors = contributors.filter(|list| !list.is_empty()).map(|list| {
        list.into_iter()
            .map(|c| Contributor {
                name: c.login,
                contributions: c.contributions,
            })
            .collect()
    });

    Repository {
        name: RepositoryName::from(repo.name.as_str()),
        organization: organization.clone(),
        created_at: repo.created_at,
        latest_commit_at: repo.pushed_at,
        archived: repo.archived,
        disabled: repo.disabled,
        open_issues: repo.open_issues_count,
        has_issues: repo.has_issues,
        url: repo.html_url.clone(),
        default_branch: repo.default_branch.clone(),
        main_language: repo.language.clone(),
        languages,
        contributors,
        last_synced_at: now,
        size_history: vec![SizeSample {
            size: repo.size,
            timestamp: now,
        }],
    }
}

/// Insert the document, or replace the stored one with merged size history.
fn write_document<S: DocumentStore>(
    store: &mut S,
    settings: &SyncSettings,
    mut document: Repository,
    sample: SizeSample,
) -> Result<WriteOutcome, SyncError> {
    let key = document.key();
    let Some(current) = stored_repos::find_one(store, &key)? else {
        tracing::debug!(repository = %key, "document not found, inserting");
        stored_repos::insert(store, &document).map_err(|err| {
            classify_write(err, |reason| ReconcileError::RepositoryInsert {
                key: key.clone(),
                reason,
            })
        })?;
        return Ok(WriteOutcome::Inserted);
    };

    tracing::debug!(repository = %key, "document already stored, updating");
    let before = current.size_history.len();
    document.size_history =
        merge_size_history(current.size_history, sample, settings.size_sample_interval);
    let sample_appended = document.size_history.len() > before;

    let modified = stored_repos::replace(store, &document).map_err(|err| {
        classify_write(err, |reason| ReconcileError::RepositoryUpdate {
            key: key.clone(),
            reason,
        })
    })?;
    if modified == 0 {
        return Err(ReconcileError::RepositoryNotModified { key }.into());
    }
    Ok(WriteOutcome::Updated { sample_appended })
}

/// Delete stored repositories of `organization` that the remote no longer
/// lists.
fn prune_missing<S: DocumentStore>(
    store: &mut S,
    organization: &OrganizationName,
    fetched: &[RemoteRepository],
    state: &mut PassState,
) -> Result<(), SyncError> {
    let fetched: HashSet<&str> = fetched.iter().map(|repo| repo.name.as_str()).collect();
    let missing: Vec<RepositoryName> = stored_repos::find_by_organization(store, organization)?
        .into_iter()
        .map(|repo| repo.name)
        .filter(|name| !fetched.contains(name.0.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let pruned = stored_repos::delete_by_keys(store, organization, &missing)?;
    tracing::info!(
        organization = %organization,
        count = pruned,
        "deleted repositories no longer listed remotely",
    );
    state.report.repositories_pruned += pruned;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn remote_repo() -> RemoteRepository {
        RemoteRepository {
            name: "radar".to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            pushed_at: None,
            archived: true,
            disabled: false,
            open_issues_count: 4,
            has_issues: true,
            html_url: "https://github.com/acme/radar".to_string(),
            default_branch: Some("main".to_string()),
            language: Some("Rust".to_string()),
            size: 512,
        }
    }

    #[test]
    fn document_maps_remote_fields() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let contributors = vec![RemoteContributor {
            login: "octocat".to_string(),
            contributions: 12,
        }];
        let doc = document_from_remote(
            &OrganizationName::from("acme"),
            &remote_repo(),
            Some([("Rust".to_string(), 2048)].into_iter().collect()),
            Some(contributors),
            now,
        );
        assert_eq!(doc.organization.0, "acme");
        assert_eq!(doc.open_issues, 4);
        assert!(doc.archived);
        assert_eq!(doc.url, "https://github.com/acme/radar");
        assert_eq!(doc.main_language.as_deref(), Some("Rust"));
        assert_eq!(doc.last_synced_at, now);
        assert_eq!(
            doc.contributors,
            Some(vec![Contributor {
                name: "octocat".to_string(),
                contributions: 12
            }])
        );
        assert_eq!(
            doc.size_history,
            vec![SizeSample {
                size: 512,
                timestamp: now
            }]
        );
    }

    #[test]
    fn empty_contributor_list_is_stored_as_absent() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let doc = document_from_remote(
            &OrganizationName::from("acme"),
            &remote_repo(),
            None,
            Some(vec![]),
            now,
        );
        assert!(doc.contributors.is_none());
        assert!(doc.languages.is_none());
    }
}
