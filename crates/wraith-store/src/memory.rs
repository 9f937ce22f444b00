use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::ExecutionRecord;
use crate::{ExecutionStore, StoreError};

/// Number of runs retained when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 50;

/// A bounded, in-memory run history.
///
/// Holds at most `capacity` records; appending to a full store evicts the
/// oldest one. Safe to share between concurrent runs.
#[derive(Debug)]
pub struct MemoryStore {
  capacity: usize,
  records: RwLock<VecDeque<ExecutionRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::with_capacity(DEFAULT_CAPACITY)
  }

  /// Create a store retaining `capacity` runs (at least one).
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      capacity,
      records: RwLock::new(VecDeque::with_capacity(capacity)),
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub async fn len(&self) -> usize {
    self.records.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.records.read().await.is_empty()
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl ExecutionStore for MemoryStore {
  async fn append(&self, record: ExecutionRecord) -> Result<(), StoreError> {
    let mut records = self.records.write().await;

    if records.iter().any(|r| r.id == record.id) {
      return Err(StoreError::Duplicate(record.id));
    }

    while records.len() >= self.capacity {
      if let Some(evicted) = records.pop_front() {
        debug!(run_id = %evicted.id, "evicted oldest run from history");
      }
    }

    records.push_back(record);
    Ok(())
  }

  async fn get(&self, id: &str) -> Result<Option<ExecutionRecord>, StoreError> {
    let records = self.records.read().await;
    Ok(records.iter().find(|r| r.id == id).cloned())
  }

  async fn list(&self) -> Result<Vec<ExecutionRecord>, StoreError> {
    let records = self.records.read().await;
    Ok(records.iter().rev().cloned().collect())
  }
}
