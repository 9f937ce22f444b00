//! Execution events and notifiers for observability.
//!
//! Events are emitted while a run progresses so consumers can stream status
//! to a UI or a terminal without waiting for the final record.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use wraith_store::RunStatus;

/// Events emitted during a flow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// The run passed validation and is about to execute its first node.
  RunStarted {
    run_id: String,
    flow_id: String,
    node_count: usize,
  },

  /// A node has started executing.
  NodeStarted {
    run_id: String,
    node_id: String,
    node_type: String,
  },

  /// A node has completed successfully.
  NodeCompleted {
    run_id: String,
    node_id: String,
    output: serde_json::Value,
    duration_ms: u64,
  },

  /// A node has failed.
  NodeFailed {
    run_id: String,
    node_id: String,
    error: String,
  },

  /// A node was not executed because the run had already halted.
  NodeSkipped {
    run_id: String,
    node_id: String,
    reason: String,
  },

  /// The run stopped executing nodes.
  RunHalted {
    run_id: String,
    node_id: String,
    reason: String,
  },

  /// The run has finished and its record is final.
  RunFinished {
    run_id: String,
    status: RunStatus,
    success_count: usize,
    error_count: usize,
    skipped_count: usize,
  },
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event; implementations decide what to
/// do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls a run; volume is a handful of
  // events per node.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
