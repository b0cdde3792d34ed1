use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_test::assert_ok;

use radar_core::Backoff;
use radar_daemon::{run_loop, DaemonError, Schedule, StopReason};
use radar_remote::RemoteError;
use radar_store::StoreError;
use radar_sync::{Pass, PassReport, SyncError};

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Ok,
    Classified,
    Fatal,
}

/// Plays back `script`, then repeats `then` forever.
struct ScriptedPass {
    script: VecDeque<Outcome>,
    then: Outcome,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPass {
    fn new(script: &[Outcome], then: Outcome) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let pass = Self {
            script: script.iter().copied().collect(),
            then,
            calls: calls.clone(),
        };
        (pass, calls)
    }
}

impl Pass for ScriptedPass {
    fn run_pass(&mut self) -> Result<PassReport, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front().unwrap_or(self.then) {
            Outcome::Ok => Ok(PassReport::default()),
            Outcome::Classified => Err(SyncError::Remote(RemoteError::BadStatus {
                status: 502,
                url: "https://api.github.com/user/orgs".to_string(),
            })),
            Outcome::Fatal => Err(SyncError::Store(StoreError::Io {
                path: "/data/repositories.json".into(),
                source: std::io::Error::other("disk gone"),
            })),
        }
    }
}

fn schedule(interval_minutes: u64, failure_threshold: u32) -> Schedule {
    Schedule {
        interval_minutes,
        failure_threshold,
        backoff: Backoff::None,
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test(start_paused = true)]
async fn ten_consecutive_failures_stop_the_loop_without_a_final_sleep() {
    let (pass, calls) = ScriptedPass::new(&[], Outcome::Classified);
    let started = Instant::now();

    let stop = assert_ok!(run_loop(pass, &schedule(60, 10), None, never()).await);

    assert_eq!(stop, StopReason::FailureThreshold { failures: 10 });
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    let elapsed = started.elapsed();
    assert!(elapsed >= minutes(9 * 60), "elapsed {elapsed:?}");
    assert!(elapsed < minutes(9 * 60 + 1), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn a_success_resets_the_failure_count() {
    let mut script = vec![Outcome::Classified; 9];
    script.push(Outcome::Ok);
    let (pass, calls) = ScriptedPass::new(&script, Outcome::Classified);

    let stop = assert_ok!(run_loop(pass, &schedule(60, 10), None, never()).await);

    assert_eq!(stop, StopReason::FailureThreshold { failures: 10 });
    assert_eq!(calls.load(Ordering::SeqCst), 20);
}

#[tokio::test(start_paused = true)]
async fn unclassified_failure_propagates() {
    let (pass, calls) = ScriptedPass::new(&[Outcome::Ok, Outcome::Fatal], Outcome::Ok);

    let err = run_loop(pass, &schedule(60, 10), None, never())
        .await
        .unwrap_err();

    assert!(
        matches!(err, DaemonError::Sync(SyncError::Store(_))),
        "got {err:?}"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn pass_limit_stops_after_the_last_pass() {
    let (pass, calls) = ScriptedPass::new(&[], Outcome::Ok);
    let started = Instant::now();

    let stop = assert_ok!(run_loop(pass, &schedule(30, 10), Some(3), never()).await);

    assert_eq!(stop, StopReason::MaxPasses { passes: 3 });
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() < minutes(61));
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_sleep() {
    let (pass, calls) = ScriptedPass::new(&[], Outcome::Ok);

    let shutdown = tokio::time::sleep(minutes(90));
    let stop = assert_ok!(run_loop(pass, &schedule(60, 10), None, shutdown).await);

    assert_eq!(stop, StopReason::Interrupted);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn backoff_lengthens_sleep_after_failures() {
    let (pass, calls) = ScriptedPass::new(&[], Outcome::Classified);
    let schedule = Schedule {
        interval_minutes: 10,
        failure_threshold: 3,
        backoff: Backoff::Exponential {
            base_minutes: 5,
            max_minutes: 30,
        },
    };
    let started = Instant::now();

    let stop = assert_ok!(run_loop(pass, &schedule, None, never()).await);

    assert_eq!(stop, StopReason::FailureThreshold { failures: 3 });
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // (10 + 5) after the first failure, (10 + 10) after the second.
    let elapsed = started.elapsed();
    assert!(elapsed >= minutes(35), "elapsed {elapsed:?}");
    assert!(elapsed < minutes(36), "elapsed {elapsed:?}");
}
