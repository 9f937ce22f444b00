//! Error types for flow execution.

use thiserror::Error;
use wraith_flow::FlowError;
use wraith_host::HostError;
use wraith_store::StoreError;

/// Errors that reject a run before any node executes, or that come from the
/// history store. In-run failures are recorded per node as [`NodeError`]s.
#[derive(Debug, Error)]
pub enum EngineError {
  /// Missing wallet, empty flow, duplicate node id or dangling edge.
  #[error("invalid flow run: {message}")]
  Validation { message: String },

  /// The flow graph is not a DAG.
  #[error("flow cannot be ordered: {0}")]
  Cycle(#[source] FlowError),

  /// The run history could not be read or written.
  #[error("execution store error: {0}")]
  Store(#[from] StoreError),
}

impl EngineError {
  pub fn validation(message: impl Into<String>) -> Self {
    EngineError::Validation {
      message: message.into(),
    }
  }
}

impl From<FlowError> for EngineError {
  fn from(e: FlowError) -> Self {
    match e {
      FlowError::Cycle { .. } => EngineError::Cycle(e),
      other => EngineError::validation(other.to_string()),
    }
  }
}

/// Errors raised while executing a single node.
///
/// Every variant ends up as a `Failed` node result and halts the rest of the run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NodeError {
  #[error("unsupported node type \"{0}\"")]
  UnsupportedNodeType(String),

  #[error("invalid parameters: {0}")]
  InvalidParams(String),

  #[error("failed to render parameter '{key}': {message}")]
  Template { key: String, message: String },

  #[error("no {0} configured")]
  MissingCapability(&'static str),

  #[error(transparent)]
  Capability(#[from] HostError),

  /// A collaborator answered but reported the task as unsuccessful.
  #[error("{0}")]
  Rejected(String),

  #[error("node timed out after {0} ms")]
  Timeout(u64),

  #[error("node panicked: {0}")]
  Panicked(String),

  #[error("run cancelled")]
  Cancelled,
}
