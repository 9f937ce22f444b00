//! Wraith Store
//!
//! This crate provides the storage trait and the in-memory implementation for
//! completed flow runs.
//!
//! The [`ExecutionStore`] trait is an append-only log of [`ExecutionRecord`]s
//! bounded to the most recent N runs:
//! - Appending a finished run (evicting the oldest when full)
//! - Fetching a run by ID
//! - Listing runs most-recent-first

mod memory;
mod types;

pub use memory::{DEFAULT_CAPACITY, MemoryStore};
pub use types::{ExecutionRecord, NodeResult, NodeStatus, RunStatus};

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// A record with the same ID is already stored.
  #[error("duplicate execution record: {0}")]
  Duplicate(String),

  /// The backing store could not be reached.
  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Storage trait for completed runs.
///
/// Records are immutable once appended; there is no update or delete.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
  /// Append a finished run.
  async fn append(&self, record: ExecutionRecord) -> Result<(), StoreError>;

  /// Get a run by ID.
  async fn get(&self, id: &str) -> Result<Option<ExecutionRecord>, StoreError>;

  /// List retained runs, most recent first.
  async fn list(&self) -> Result<Vec<ExecutionRecord>, StoreError>;
}
