use std::time::Duration;

/// Configuration for the flow engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Number of completed runs kept in the history.
  pub history_capacity: usize,
  /// Upper bound on a single Wait/Delay suspension. `None` waits the full duration.
  pub max_wait: Option<Duration>,
  /// Deadline applied to every node call. `None` leaves timeouts to collaborators.
  pub node_timeout: Option<Duration>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      history_capacity: wraith_store::DEFAULT_CAPACITY,
      max_wait: None,
      node_timeout: None,
    }
  }
}
