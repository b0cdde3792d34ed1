//! Pass orchestration.
//!
//! A pass:
//!
//! 1. Reads the stored organizations.
//! 2. If configured to always fetch, or the store has none, fetches the
//!    remote organization list and reconciles the stored set against it;
//!    the remote set then drives step 3. Otherwise the stored set does.
//! 3. Refreshes every repository of every organization.
//!
//! Failed must-succeed writes are handled per [`BatchFailurePolicy`].

use serde::Serialize;

use radar_core::{BatchFailurePolicy, OrganizationName};
use radar_remote::RemoteSource;
use radar_store::{organizations as stored_orgs, DocumentStore};

use crate::clock::{Clock, SystemClock};
use crate::error::{ReconcileError, SyncError};
use crate::settings::SyncSettings;
use crate::{organizations, repositories};

/// Counters describing what one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Organizations whose repository step ran.
    pub organizations: usize,
    pub organizations_inserted: usize,
    pub organizations_deleted: u64,
    /// Organizations whose repository list could not be fetched.
    pub organizations_skipped: usize,
    pub repositories_inserted: usize,
    pub repositories_updated: usize,
    pub repositories_pruned: u64,
    pub samples_appended: usize,
    /// Language or contributor lookups that failed and were stored as absent.
    pub enrichment_fallbacks: usize,
    pub failed_writes: usize,
}

/// One full reconciliation pass, as the scheduler sees it.
pub trait Pass {
    fn run_pass(&mut self) -> Result<PassReport, SyncError>;
}

/// What the pass does next after a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Continue,
    SkipOrganization,
}

#[derive(Debug, Default)]
pub(crate) struct PassState {
    pub report: PassReport,
    pub failures: Vec<ReconcileError>,
}

impl PassState {
    /// Apply `policy` to a failed write. `Err` means the pass stops now.
    pub fn record_failure(
        &mut self,
        err: ReconcileError,
        policy: BatchFailurePolicy,
    ) -> Result<Disposition, SyncError> {
        tracing::error!(error = %err, "store write failed");
        match policy {
            BatchFailurePolicy::AbortPass => Err(err.into()),
            BatchFailurePolicy::AbortOrganization => {
                self.failures.push(err);
                Ok(Disposition::SkipOrganization)
            }
            BatchFailurePolicy::ContinueOnError => {
                self.failures.push(err);
                Ok(Disposition::Continue)
            }
        }
    }

    fn finish(mut self) -> Result<PassReport, SyncError> {
        self.report.failed_writes = self.failures.len();
        if self.failures.is_empty() {
            return Ok(self.report);
        }
        tracing::warn!(report = ?self.report, "pass finished with failed writes");
        Err(ReconcileError::Incomplete {
            count: self.failures.len(),
            failures: self.failures,
        }
        .into())
    }
}

/// The reconciliation engine with its collaborators injected.
#[derive(Debug)]
pub struct Reconciler<R, S, C = SystemClock> {
    remote: R,
    store: S,
    clock: C,
    settings: SyncSettings,
}

impl<R, S, C> Reconciler<R, S, C>
where
    R: RemoteSource,
    S: DocumentStore,
    C: Clock,
{
    pub fn new(remote: R, store: S, clock: C, settings: SyncSettings) -> Self {
        Self {
            remote,
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Run one full pass.
    pub fn run_pass(&mut self) -> Result<PassReport, SyncError> {
        tracing::info!("reconciliation pass started");
        let mut state = PassState::default();

        let stored = stored_orgs::find_all(&self.store)?;
        let names: Vec<OrganizationName> =
            if self.settings.fetch_organizations || stored.is_empty() {
                tracing::info!("fetching organizations from remote");
                let remote = self.remote.list_organizations()?;
                organizations::reconcile(
                    &mut self.store,
                    &remote,
                    &stored,
                    &self.settings,
                    &mut state,
                )?
            } else {
                let mut names: Vec<_> = stored.into_iter().map(|org| org.name).collect();
                names.sort();
                names
            };

        tracing::info!(count = names.len(), "found organizations");
        for (index, organization) in names.iter().enumerate() {
            tracing::info!(
                organization = %organization,
                completed = %format!("{}%", percent(index + 1, names.len())),
                "reconciling organization",
            );
            repositories::reconcile_organization(
                &self.remote,
                &mut self.store,
                &self.clock,
                &self.settings,
                organization,
                &mut state,
            )?;
            state.report.organizations += 1;
        }

        let outcome = state.finish();
        if let Ok(report) = &outcome {
            tracing::info!(
                organizations = report.organizations,
                inserted = report.repositories_inserted,
                updated = report.repositories_updated,
                samples_appended = report.samples_appended,
                "reconciliation pass completed",
            );
        }
        outcome
    }
}

impl<R, S, C> Pass for Reconciler<R, S, C>
where
    R: RemoteSource,
    S: DocumentStore,
    C: Clock,
{
    fn run_pass(&mut self) -> Result<PassReport, SyncError> {
        Reconciler::run_pass(self)
    }
}

/// Rounded completion percentage for progress logs.
pub(crate) fn percent(done: usize, total: usize) -> u64 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round() as u64
}
