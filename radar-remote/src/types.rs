//! Wire shapes of the GitHub REST responses, reduced to the fields the
//! mirror keeps.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language name -> bytes of code.
pub type LanguageBreakdown = BTreeMap<String, u64>;

/// Entry of `GET /user/orgs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrganization {
    pub login: String,
}

/// Entry of `GET /orgs/{org}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// `null` for repositories that never received a push.
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub has_issues: bool,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Kilobytes, as reported by the platform.
    #[serde(default)]
    pub size: u64,
}

/// Entry of `GET /repos/{org}/{repo}/contributors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteContributor {
    /// Empty for anonymous contributors.
    #[serde(default)]
    pub login: String,
    pub contributions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_tolerates_nulls_and_extra_fields() {
        let json = r#"{
            "id": 1,
            "name": "empty",
            "created_at": "2024-01-01T00:00:00Z",
            "pushed_at": null,
            "archived": false,
            "disabled": false,
            "open_issues_count": 0,
            "has_issues": true,
            "html_url": "https://github.com/acme/empty",
            "default_branch": "main",
            "language": null,
            "size": 0,
            "owner": {"login": "acme"}
        }"#;
        let repo: RemoteRepository = serde_json::from_str(json).expect("decode");
        assert_eq!(repo.name, "empty");
        assert!(repo.pushed_at.is_none());
        assert!(repo.language.is_none());
    }

    #[test]
    fn anonymous_contributor_has_empty_login() {
        let c: RemoteContributor =
            serde_json::from_str(r#"{"type": "Anonymous", "contributions": 4}"#).expect("decode");
        assert_eq!(c.login, "");
        assert_eq!(c.contributions, 4);
    }
}
