//! Engine settings derived from the `daemon` config section.

use chrono::Duration;

use radar_core::config::MAX_SAMPLE_INTERVAL_DAYS;
use radar_core::{BatchFailurePolicy, DaemonConfig, RepositoryPrunePolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Re-fetch organizations every pass, not only on an empty store.
    pub fetch_organizations: bool,
    /// A new size sample is kept only if it is strictly more than this
    /// after the latest stored one.
    pub size_sample_interval: Duration,
    pub batch_failure_policy: BatchFailurePolicy,
    pub repository_prune_policy: RepositoryPrunePolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from_config(&DaemonConfig::default())
    }
}

impl SyncSettings {
    pub fn from_config(config: &DaemonConfig) -> Self {
        let days = config
            .size_sample_interval_days
            .min(MAX_SAMPLE_INTERVAL_DAYS) as i64;
        Self {
            fetch_organizations: config.fetch_organizations,
            size_sample_interval: Duration::days(days),
            batch_failure_policy: config.batch_failure_policy,
            repository_prune_policy: config.repository_prune_policy,
        }
    }
}
