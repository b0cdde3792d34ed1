//! Error types for radar-remote.

use thiserror::Error;

/// A failed request to the remote platform.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The platform answered with a status other than 200 or 204.
    #[error("request to GitHub returned invalid status code: {status}, for url: {url}")]
    BadStatus { status: u16, url: String },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// A 200 response whose body did not match the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// HTTP status for [`RemoteError::BadStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
