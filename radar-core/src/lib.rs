//! octoradar core library: domain documents, configuration and errors.
//!
//! - [`types`]: newtypes and the organization/repository documents
//! - [`config`]: YAML configuration load / validate
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    Backoff, BatchFailurePolicy, Config, DaemonConfig, GithubConfig, LogConfig,
    RepositoryPrunePolicy, StoreConfig,
};
pub use error::ConfigError;
pub use types::{
    Contributor, Organization, OrganizationName, Repository, RepositoryKey, RepositoryName,
    SizeSample,
};
