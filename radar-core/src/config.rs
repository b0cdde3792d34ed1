//! YAML configuration.
//!
//! # Layout
//!
//! ```text
//! ~/.octoradar/
//!   config.yaml   (this file)
//!   data/         (default document store directory)
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.
//! `RADAR_GITHUB_TOKEN` overrides `github.token`.
//!
//! As with the store helpers, every loader has an explicit-path form
//! (`load_from`, `load_at`) used by tests and a convenience form that derives
//! the home directory from `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const TOKEN_ENV: &str = "RADAR_GITHUB_TOKEN";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Upper bound for `daemon.size_sample_interval_days` (a century).
pub const MAX_SAMPLE_INTERVAL_DAYS: u64 = 36_500;
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// 1. Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub store: StoreConfig,
    pub daemon: DaemonConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON file per collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured directory with a leading `~/` expanded, or
    /// `~/.octoradar/data` when unset.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.path {
            Some(path) => match path.strip_prefix("~") {
                Ok(rest) => Ok(home()?.join(rest)),
                Err(_) => Ok(path.clone()),
            },
            None => Ok(default_store_path_at(&home()?)),
        }
    }
}

/// Reconciliation and scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Minutes between the start of one pass and the start of the next.
    pub interval_minutes: u64,
    /// Re-fetch the organization list every pass instead of only when the
    /// store holds no organizations.
    pub fetch_organizations: bool,
    /// Minimum days between two retained size samples.
    pub size_sample_interval_days: u64,
    /// Consecutive classified failures after which the daemon stops.
    pub failure_threshold: u32,
    pub backoff: Backoff,
    pub batch_failure_policy: BatchFailurePolicy,
    pub repository_prune_policy: RepositoryPrunePolicy,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
            fetch_organizations: true,
            size_sample_interval_days: 7,
            failure_threshold: 10,
            backoff: Backoff::default(),
            batch_failure_policy: BatchFailurePolicy::default(),
            repository_prune_policy: RepositoryPrunePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub colorize: bool,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            colorize: true,
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Policies
// ---------------------------------------------------------------------------

/// Extra delay added to the scheduler sleep after a failed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    #[default]
    None,
    /// `min(base_minutes * 2^(failures - 1), max_minutes)`.
    Exponential { base_minutes: u64, max_minutes: u64 },
}

impl Backoff {
    /// Extra minutes to wait after `consecutive_failures` failed passes.
    pub fn extra_minutes(&self, consecutive_failures: u32) -> u64 {
        match *self {
            Backoff::None => 0,
            Backoff::Exponential { .. } if consecutive_failures == 0 => 0,
            Backoff::Exponential {
                base_minutes,
                max_minutes,
            } => {
                let shift = (consecutive_failures - 1).min(63);
                base_minutes
                    .checked_mul(1u64 << shift)
                    .unwrap_or(u64::MAX)
                    .min(max_minutes)
            }
        }
    }
}

/// What a failed organization insert or repository write does to the rest
/// of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchFailurePolicy {
    /// Stop the pass at the first failure.
    #[default]
    AbortPass,
    /// Abandon the failing organization's remaining repositories, keep going
    /// with the next organization, fail the pass at the end.
    AbortOrganization,
    /// Record the failure, keep going, fail the pass at the end.
    ContinueOnError,
}

/// Whether repository documents that disappeared remotely are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryPrunePolicy {
    /// Never delete repository documents.
    #[default]
    Keep,
    /// Delete repositories missing from a fully processed organization and
    /// repositories of deleted organizations.
    RemoveMissing,
}

// ---------------------------------------------------------------------------
// 3. Paths
// ---------------------------------------------------------------------------

pub fn radar_root(home: &Path) -> PathBuf {
    home.join(".octoradar")
}

/// `<home>/.octoradar/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    radar_root(home).join("config.yaml")
}

/// `<home>/.octoradar/data`. Pure, no I/O.
pub fn default_store_path_at(home: &Path) -> PathBuf {
    radar_root(home).join("data")
}

// ---------------------------------------------------------------------------
// 4. Load
// ---------------------------------------------------------------------------

/// Load, apply environment overrides and validate the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path
/// + line context) if malformed, `ConfigError::Invalid` if a value is out of
/// range.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let mut config = parse_file(path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate(path)?;
    Ok(config)
}

/// Load `<home>/.octoradar/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Apply environment overrides through `lookup` (injected for tests).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.github.token = Some(token);
        }
    }

    /// Reject values the engine or scheduler cannot work with.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            field,
            reason: reason.to_string(),
        };

        if self.github.api_url.trim().is_empty() {
            return Err(invalid("github.api_url", "must not be empty"));
        }
        if self.github.timeout_secs == 0 {
            return Err(invalid("github.timeout_secs", "must be at least 1"));
        }
        if self.daemon.interval_minutes == 0 {
            return Err(invalid("daemon.interval_minutes", "must be at least 1"));
        }
        if self.daemon.size_sample_interval_days > MAX_SAMPLE_INTERVAL_DAYS {
            return Err(invalid(
                "daemon.size_sample_interval_days",
                &format!("must not exceed {MAX_SAMPLE_INTERVAL_DAYS}"),
            ));
        }
        if self.daemon.failure_threshold == 0 {
            return Err(invalid("daemon.failure_threshold", "must be at least 1"));
        }
        if let Backoff::Exponential {
            base_minutes,
            max_minutes,
        } = self.daemon.backoff
        {
            if base_minutes == 0 {
                return Err(invalid("daemon.backoff.base_minutes", "must be at least 1"));
            }
            if max_minutes < base_minutes {
                return Err(invalid(
                    "daemon.backoff.max_minutes",
                    "must not be smaller than base_minutes",
                ));
            }
        }
        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(invalid(
                "log.level",
                &format!("'{}' is not one of {}", self.log.level, LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }

    /// Copy with the API token masked, for printing.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        if copy.github.token.is_some() {
            copy.github.token = Some("***".to_string());
        }
        copy
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = Config::default();
        assert_eq!(config.daemon.interval_minutes, 60);
        assert_eq!(config.daemon.failure_threshold, 10);
        assert!(config.daemon.fetch_organizations);
        assert_eq!(config.daemon.batch_failure_policy, BatchFailurePolicy::AbortPass);
        assert_eq!(config.daemon.repository_prune_policy, RepositoryPrunePolicy::Keep);
        assert_eq!(config.daemon.backoff, Backoff::None);
        assert!(config.validate(Path::new("config.yaml")).is_ok());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 5)]
    #[case(2, 10)]
    #[case(3, 20)]
    #[case(4, 30)]
    #[case(64, 30)]
    fn exponential_backoff_is_capped(#[case] failures: u32, #[case] expected: u64) {
        let backoff = Backoff::Exponential {
            base_minutes: 5,
            max_minutes: 30,
        };
        assert_eq!(backoff.extra_minutes(failures), expected);
    }

    #[test]
    fn no_backoff_never_adds_delay() {
        assert_eq!(Backoff::None.extra_minutes(9), 0);
    }

    #[test]
    fn env_token_overrides_file_token() {
        let mut config = Config::default();
        config.github.token = Some("from-file".to_string());
        config.apply_env_overrides(|key| (key == TOKEN_ENV).then(|| "from-env".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn blank_env_token_is_ignored() {
        let mut config = Config::default();
        config.github.token = Some("from-file".to_string());
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn redacted_masks_token() {
        let mut config = Config::default();
        config.github.token = Some("ghp_secret".to_string());
        let yaml = config.redacted().to_yaml().expect("yaml");
        assert!(!yaml.contains("ghp_secret"));
        assert!(yaml.contains("***"));
    }

    #[test]
    fn explicit_store_path_is_kept() {
        let store = StoreConfig {
            path: Some(PathBuf::from("/var/lib/octoradar")),
        };
        assert_eq!(
            store.resolved_path().expect("path"),
            PathBuf::from("/var/lib/octoradar")
        );
    }
}
