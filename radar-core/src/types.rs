//! Domain documents mirrored from the code-hosting platform.
//!
//! Both documents serialize to JSON objects with snake_case field names;
//! timestamps are RFC 3339 UTC.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The login of an organization on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationName(pub String);

impl fmt::Display for OrganizationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OrganizationName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrganizationName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A repository name, unique only within its organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryName(pub String);

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepositoryName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepositoryName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Composite identity of a repository document: `(name, organization)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryKey {
    pub organization: OrganizationName,
    pub name: RepositoryName,
}

impl RepositoryKey {
    pub fn new(organization: impl Into<OrganizationName>, name: impl Into<RepositoryName>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.name)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A mirrored organization. Only inserted and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: OrganizationName,
    #[serde(default)]
    pub description: String,
}

impl Organization {
    /// A freshly observed organization; descriptions start empty.
    pub fn observed(name: impl Into<OrganizationName>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

/// One timestamped byte-size measurement of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSample {
    pub size: u64,
    pub timestamp: DateTime<Utc>,
}

/// A contributor summary as stored on the repository document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub contributions: u64,
}

/// A mirrored repository.
///
/// Every field is overwritten on each sync except `size_history`, which is
/// merged with what is already stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: RepositoryName,
    pub organization: OrganizationName,
    pub created_at: DateTime<Utc>,
    /// Remote `pushed_at`; absent for repositories that never received a push.
    pub latest_commit_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub has_issues: bool,
    pub url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub main_language: Option<String>,
    /// Language name -> bytes. `None` when the remote lookup failed.
    #[serde(default)]
    pub languages: Option<BTreeMap<String, u64>>,
    /// `None` when the remote lookup failed or returned nothing.
    #[serde(default)]
    pub contributors: Option<Vec<Contributor>>,
    pub last_synced_at: DateTime<Utc>,
    #[serde(default)]
    pub size_history: Vec<SizeSample>,
}

impl Repository {
    pub fn key(&self) -> RepositoryKey {
        RepositoryKey {
            organization: self.organization.clone(),
            name: self.name.clone(),
        }
    }

    /// Chronologically last sample, regardless of stored order.
    pub fn latest_sample(&self) -> Option<&SizeSample> {
        self.size_history.iter().max_by_key(|s| s.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
