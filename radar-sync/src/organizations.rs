//! Organization step: make the stored organization set equal the remote one.

use std::collections::{BTreeSet, HashSet};

use radar_core::{Organization, OrganizationName, RepositoryPrunePolicy};
use radar_remote::RemoteOrganization;
use radar_store::{organizations as stored_orgs, repositories as stored_repos, DocumentStore};

use crate::engine::PassState;
use crate::error::{classify_write, ReconcileError, SyncError};
use crate::settings::SyncSettings;

/// Insert organizations seen remotely but not stored, delete stored ones no
/// longer seen remotely. Returns the remote names, which drive the
/// repository step whether or not every write here succeeded.
pub(crate) fn reconcile<S: DocumentStore>(
    store: &mut S,
    remote: &[RemoteOrganization],
    stored: &[Organization],
    settings: &SyncSettings,
    state: &mut PassState,
) -> Result<Vec<OrganizationName>, SyncError> {
    let remote_names: BTreeSet<OrganizationName> = remote
        .iter()
        .map(|org| OrganizationName::from(org.login.as_str()))
        .collect();
    let stored_names: HashSet<&OrganizationName> = stored.iter().map(|org| &org.name).collect();

    let new: Vec<&OrganizationName> = remote_names
        .iter()
        .filter(|name| !stored_names.contains(name))
        .collect();
    tracing::info!(count = new.len(), "found new organizations, inserting");
    for name in new {
        match stored_orgs::insert(store, &Organization::observed(name.clone())) {
            Ok(()) => state.report.organizations_inserted += 1,
            Err(err) => {
                let err = classify_write(err, |reason| ReconcileError::OrganizationInsert {
                    name: name.clone(),
                    reason,
                });
                match err {
                    SyncError::Reconcile(err) => {
                        state.record_failure(err, settings.batch_failure_policy)?;
                    }
                    other => return Err(other),
                }
            }
        }
    }

    // Ask the store which organizations are stale rather than trusting the
    // list read at the start of the pass.
    let remote_names: Vec<OrganizationName> = remote_names.into_iter().collect();
    let stale: Vec<OrganizationName> = stored_orgs::find_not_in(store, &remote_names)?
        .into_iter()
        .map(|org| org.name)
        .collect();
    tracing::info!(count = stale.len(), "found deleted organizations, deleting");
    let deleted = stored_orgs::delete_by_names(store, &stale)?;
    if deleted != stale.len() as u64 {
        tracing::warn!(
            requested = stale.len(),
            deleted,
            "organization delete count mismatch",
        );
    }
    state.report.organizations_deleted += deleted;

    if settings.repository_prune_policy == RepositoryPrunePolicy::RemoveMissing && !stale.is_empty()
    {
        let pruned = stored_repos::delete_by_organizations(store, &stale)?;
        tracing::info!(count = pruned, "deleted repositories of deleted organizations");
        state.report.repositories_pruned += pruned;
    }

    Ok(remote_names)
}
