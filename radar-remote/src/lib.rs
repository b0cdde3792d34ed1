//! # radar-remote
//!
//! Read-only access to the code-hosting platform.
//!
//! [`RemoteSource`] is what the reconciliation engine consumes;
//! [`GithubClient`] implements it over the GitHub REST API.

pub mod error;
pub mod github;
pub mod source;
pub mod types;

pub use error::RemoteError;
pub use github::GithubClient;
pub use source::RemoteSource;
pub use types::{LanguageBreakdown, RemoteContributor, RemoteOrganization, RemoteRepository};
