//! The fixed-interval loop that drives reconciliation passes.
//!
//! Passes never overlap: each one runs to completion on a blocking worker
//! before the loop decides how long to sleep. A run of `failure_threshold`
//! consecutive classified failures stops the loop cleanly; an unclassified
//! failure propagates out of it.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use radar_core::{Backoff, DaemonConfig};
use radar_sync::{Pass, PassReport, SyncError};

use crate::error::DaemonError;

/// Timing and stop rules for the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub interval_minutes: u64,
    pub failure_threshold: u32,
    pub backoff: Backoff,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from_config(&DaemonConfig::default())
    }
}

impl Schedule {
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self {
            interval_minutes: config.interval_minutes,
            failure_threshold: config.failure_threshold,
            backoff: config.backoff,
        }
    }
}

/// Why the loop returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// `failures` consecutive passes failed.
    FailureThreshold { failures: u32 },
    /// Ctrl-C, or whatever shutdown signal the caller supplied.
    Interrupted,
    /// The caller's pass limit was reached.
    MaxPasses { passes: u64 },
}

/// Minutes to sleep after a pass that took `elapsed`, so the next pass
/// starts `interval_minutes` after this one started. Elapsed time is rounded
/// to whole minutes, ties to even.
pub fn sleep_minutes(interval_minutes: u64, elapsed: Duration) -> u64 {
    let elapsed_minutes = (elapsed.as_secs_f64() / 60.0).round_ties_even() as u64;
    interval_minutes.saturating_sub(elapsed_minutes)
}

impl Schedule {
    /// Minutes to sleep after a pass that took `elapsed` and left the loop at
    /// `consecutive_failures`, backoff included.
    pub fn next_sleep_minutes(&self, elapsed: Duration, consecutive_failures: u32) -> u64 {
        sleep_minutes(self.interval_minutes, elapsed)
            .saturating_add(self.backoff.extra_minutes(consecutive_failures))
    }
}

/// Run passes until a stop condition is met.
///
/// `shutdown` resolving interrupts the loop, whether it is sleeping or
/// waiting on a pass. An interrupted pass is left to finish on its worker.
pub async fn run_loop<P, F>(
    pass: P,
    schedule: &Schedule,
    max_passes: Option<u64>,
    shutdown: F,
) -> Result<StopReason, DaemonError>
where
    P: Pass + Send + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut pass = pass;
    let mut consecutive_failures: u32 = 0;
    let mut passes: u64 = 0;

    loop {
        tracing::info!("executing reconciliation pass");
        let started = Instant::now();
        let worker = tokio::task::spawn_blocking(move || {
            let mut current = pass;
            let outcome = current.run_pass();
            (current, outcome)
        });

        let (returned, outcome): (P, Result<PassReport, SyncError>) = tokio::select! {
            joined = worker => joined?,
            _ = &mut shutdown => {
                tracing::info!("shutdown requested during a pass, stopping daemon");
                return Ok(StopReason::Interrupted);
            }
        };
        pass = returned;
        passes += 1;

        match outcome {
            Ok(report) => {
                consecutive_failures = 0;
                tracing::debug!(report = ?report, "pass report");
            }
            Err(err) if err.is_classified() => {
                consecutive_failures += 1;
                tracing::error!(
                    error = %err,
                    consecutive_failures,
                    threshold = schedule.failure_threshold,
                    "reconciliation pass failed",
                );
            }
            Err(err) => {
                tracing::error!(error = %err, "unrecoverable error, stopping daemon");
                return Err(err.into());
            }
        }

        if consecutive_failures >= schedule.failure_threshold {
            tracing::error!(
                failures = consecutive_failures,
                "reached the maximum number of consecutive failures, exiting",
            );
            return Ok(StopReason::FailureThreshold {
                failures: consecutive_failures,
            });
        }
        if max_passes.is_some_and(|max| passes >= max) {
            tracing::info!(passes, "pass limit reached, stopping daemon");
            return Ok(StopReason::MaxPasses { passes });
        }

        let elapsed = started.elapsed();
        let minutes = schedule.next_sleep_minutes(elapsed, consecutive_failures);
        tracing::info!(
            execution_minutes = (elapsed.as_secs_f64() / 60.0).round_ties_even() as u64,
            "pass finished",
        );
        tracing::info!(minutes, "sleeping until next pass");

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(minutes.saturating_mul(60))) => {}
            _ = &mut shutdown => {
                tracing::info!("shutdown requested, stopping daemon");
                return Ok(StopReason::Interrupted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_fills_the_rest_of_the_interval() {
        assert_eq!(sleep_minutes(60, Duration::from_secs(5 * 60)), 55);
        assert_eq!(sleep_minutes(60, Duration::ZERO), 60);
    }

    #[test]
    fn overrunning_pass_sleeps_zero() {
        assert_eq!(sleep_minutes(60, Duration::from_secs(75 * 60)), 0);
    }

    #[test]
    fn elapsed_minutes_round_half_to_even() {
        // 2.5 minutes rounds to 2, 3.5 minutes rounds to 4.
        assert_eq!(sleep_minutes(10, Duration::from_secs(150)), 8);
        assert_eq!(sleep_minutes(10, Duration::from_secs(210)), 6);
        // 29 seconds rounds to zero minutes.
        assert_eq!(sleep_minutes(10, Duration::from_secs(29)), 10);
    }

    #[test]
    fn backoff_is_added_to_the_sleep() {
        let schedule = Schedule {
            interval_minutes: 10,
            failure_threshold: 5,
            backoff: Backoff::Exponential {
                base_minutes: 5,
                max_minutes: 30,
            },
        };
        assert_eq!(schedule.next_sleep_minutes(Duration::ZERO, 0), 10);
        assert_eq!(schedule.next_sleep_minutes(Duration::ZERO, 2), 20);
    }

    #[test]
    fn huge_backoff_saturates_instead_of_overflowing() {
        let schedule = Schedule {
            interval_minutes: 60,
            failure_threshold: 100,
            backoff: Backoff::Exponential {
                base_minutes: 3,
                max_minutes: u64::MAX,
            },
        };
        assert_eq!(schedule.next_sleep_minutes(Duration::ZERO, 80), u64::MAX);
    }

    #[test]
    fn schedule_follows_daemon_config() {
        let config = DaemonConfig {
            interval_minutes: 15,
            failure_threshold: 3,
            ..DaemonConfig::default()
        };
        let schedule = Schedule::from_config(&config);
        assert_eq!(schedule.interval_minutes, 15);
        assert_eq!(schedule.failure_threshold, 3);
        assert_eq!(schedule.backoff, Backoff::None);
    }
}
