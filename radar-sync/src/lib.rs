//! # radar-sync
//!
//! The reconciliation engine: one pass reconciles the stored organization
//! set against the remote one, then refreshes every repository document of
//! every organization, merging size history instead of replacing it.
//!
//! Build a [`Reconciler`] from injected collaborators and call
//! [`Reconciler::run_pass`], or drive it through the [`Pass`] trait.

pub mod clock;
pub mod engine;
pub mod error;
pub mod history;
mod organizations;
mod repositories;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Pass, PassReport, Reconciler};
pub use error::{ReconcileError, SyncError};
pub use history::merge_size_history;
pub use settings::SyncSettings;
