//! # radar-store
//!
//! Document store capability used by the reconciliation engine.
//!
//! [`DocumentStore`] exposes generic collection-scoped operations;
//! [`organizations`] and [`repositories`] are typed helpers composed over
//! it. [`JsonFileStore`] persists to disk, [`MemoryStore`] lives in process.

pub mod error;
pub mod filter;
pub mod json_file;
pub mod memory;
pub mod organizations;
pub mod repositories;
mod store;

pub use error::StoreError;
pub use filter::Filter;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{Document, DocumentStore};
