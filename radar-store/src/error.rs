//! Error types for radar-store.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be read or written (disk full, permission denied,
    /// directory gone).
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file exists but does not hold a JSON array of objects.
    #[error("corrupt collection file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A typed document could not be encoded or a stored one decoded.
    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store refused a single document write.
    #[error("write rejected in '{collection}': {reason}")]
    Rejected { collection: String, reason: String },
}

impl StoreError {
    /// `true` for document-level write refusals; everything else means the
    /// store itself is unusable.
    pub fn is_rejection(&self) -> bool {
        matches!(self, StoreError::Rejected { .. })
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`StoreError::Rejected`].
pub(crate) fn rejected(collection: &str, reason: impl Into<String>) -> StoreError {
    StoreError::Rejected {
        collection: collection.to_string(),
        reason: reason.into(),
    }
}
