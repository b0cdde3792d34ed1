//! Scheduler loop and process runtime for the mirror daemon.

mod error;
mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, start_blocking};
pub use scheduler::{run_loop, sleep_minutes, Schedule, StopReason};
