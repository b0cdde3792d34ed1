use std::path::PathBuf;

use thiserror::Error;

/// Everything that stops the daemon other than its own stop conditions.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] radar_core::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] radar_store::StoreError),

    /// A pass failed in a way that is not worth retrying.
    #[error("sync error: {0}")]
    Sync(#[from] radar_sync::SyncError),

    #[error("pass worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("ctrl-c handler failed: {0}")]
    Signal(#[source] std::io::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
