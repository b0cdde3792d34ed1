//! Error types for radar-sync, and the classification the scheduler uses.

use thiserror::Error;

use radar_core::{OrganizationName, RepositoryKey};
use radar_remote::RemoteError;
use radar_store::StoreError;

/// A store write that had to succeed did not.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("error while inserting org {name} into the db: {reason}")]
    OrganizationInsert {
        name: OrganizationName,
        reason: String,
    },

    #[error("failed to insert doc into the db for repo {key}: {reason}")]
    RepositoryInsert { key: RepositoryKey, reason: String },

    #[error("failed to update doc in the db for repo {key}: {reason}")]
    RepositoryUpdate { key: RepositoryKey, reason: String },

    /// The update matched nothing although the document was just read.
    #[error("failed to update doc in the db for repo {key}: no document modified")]
    RepositoryNotModified { key: RepositoryKey },

    /// The pass ran to the end but some writes failed along the way.
    #[error("{count} write(s) failed during the pass")]
    Incomplete {
        count: usize,
        failures: Vec<ReconcileError>,
    },
}

/// Everything a pass can fail with.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// The store itself is unusable; not retried.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Classified failures count toward the scheduler's failure threshold;
    /// anything else stops the daemon.
    pub fn is_classified(&self) -> bool {
        matches!(self, SyncError::Remote(_) | SyncError::Reconcile(_))
    }
}

/// Turn a failed must-succeed write into a [`ReconcileError`] when the store
/// merely refused the document, or pass the store failure through.
pub(crate) fn classify_write(
    err: StoreError,
    make: impl FnOnce(String) -> ReconcileError,
) -> SyncError {
    if err.is_rejection() {
        SyncError::Reconcile(make(err.to_string()))
    } else {
        SyncError::Store(err)
    }
}
