use std::time::Duration;

use radar_core::{Config, LogConfig};
use radar_remote::GithubClient;
use radar_store::JsonFileStore;
use radar_sync::{Reconciler, SyncSettings, SystemClock};

use crate::error::{io_err, DaemonError};
use crate::scheduler::{run_loop, Schedule, StopReason};

/// How long a pass still running at shutdown may hold the process open.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Start the daemon and block the current thread until it stops.
pub fn start_blocking(config: &Config, max_passes: Option<u64>) -> Result<StopReason, DaemonError> {
    init_tracing(&config.log);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    let outcome = runtime.block_on(run(config, max_passes));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    outcome
}

/// Wire the production collaborators and run the loop until it stops or
/// ctrl-c arrives.
pub async fn run(config: &Config, max_passes: Option<u64>) -> Result<StopReason, DaemonError> {
    let store_path = config.store.resolved_path()?;
    let store = JsonFileStore::open(&store_path)?;
    tracing::info!(
        store = %store_path.display(),
        api_url = %config.github.api_url,
        interval_minutes = config.daemon.interval_minutes,
        "starting octoradar daemon",
    );

    let reconciler = Reconciler::new(
        GithubClient::from_config(&config.github),
        store,
        SystemClock,
        SyncSettings::from_config(&config.daemon),
    );
    let schedule = Schedule::from_config(&config.daemon);
    run_loop(reconciler, &schedule, max_passes, ctrl_c()).await
}

/// Resolves on ctrl-c. If the handler cannot be installed the daemon keeps
/// running without it.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down daemon"),
        Err(err) => {
            tracing::warn!(error = %DaemonError::Signal(err), "ctrl-c unavailable");
            std::future::pending::<()>().await;
        }
    }
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init_tracing(log: &LogConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if log.json {
        builder.json().try_init()
    } else {
        builder.with_ansi(log.colorize).try_init()
    };
}
