//! Sequential execution of one run.
//!
//! Nodes run one at a time in topological order. Once a node fails or a
//! condition is not met, every remaining node is recorded as skipped.

use std::any::Any;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use wraith_flow::{Flow, Node};
use wraith_store::{ExecutionRecord, NodeResult, NodeStatus, RunStatus};

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::events::{ExecutionEvent, ExecutionNotifier};
use crate::executor::{self, NodeEnv, NodeOutcome};

/// Drives the nodes of a locked flow through to an [`ExecutionRecord`].
pub(crate) struct ExecutionCoordinator<'a, N: ExecutionNotifier> {
  pub flow: &'a Flow,
  pub order: Vec<String>,
  pub env: NodeEnv,
  pub notifier: &'a N,
  pub node_timeout: Option<Duration>,
  pub cancel: CancellationToken,
}

impl<N: ExecutionNotifier> ExecutionCoordinator<'_, N> {
  /// Run every node in order and assemble the record.
  ///
  /// `context` seeds the outputs visible to the first node.
  #[instrument(
    name = "flow_run",
    skip(self, context),
    fields(run_id = %self.env.run_id, flow_id = %self.flow.flow_id)
  )]
  pub async fn run(self, mut context: ExecutionContext) -> ExecutionRecord {
    let run_id = self.env.run_id.clone();
    let started_at = Utc::now();

    info!(nodes = self.order.len(), wallet = %self.env.wallet.address, "run_started");
    self.notifier.notify(ExecutionEvent::RunStarted {
      run_id: run_id.clone(),
      flow_id: self.flow.flow_id.clone(),
      node_count: self.order.len(),
    });

    let mut results = Vec::with_capacity(self.order.len());
    let mut halt: Option<String> = None;

    for node_id in &self.order {
      let Some(node) = self.flow.get_node(node_id) else {
        continue;
      };

      if halt.is_none() && self.cancel.is_cancelled() {
        halt = Some(self.record_failure(node, NodeError::Cancelled, 0, &mut results));
        continue;
      }

      if let Some(reason) = &halt {
        info!(node_id = %node.node_id, reason = %reason, "node_skipped");
        self.notifier.notify(ExecutionEvent::NodeSkipped {
          run_id: run_id.clone(),
          node_id: node.node_id.clone(),
          reason: reason.clone(),
        });
        results.push(skipped(node, reason));
        continue;
      }

      info!(node_id = %node.node_id, node_type = %node.node_type, "node_started");
      self.notifier.notify(ExecutionEvent::NodeStarted {
        run_id: run_id.clone(),
        node_id: node.node_id.clone(),
        node_type: node.node_type.to_string(),
      });

      let started = Instant::now();
      let outcome = self.dispatch(node, &context).await;
      let duration_ms = started.elapsed().as_millis() as u64;

      match outcome {
        Ok(NodeOutcome {
          output,
          condition_passed,
        }) => {
          info!(node_id = %node.node_id, duration_ms, "node_completed");
          self.notifier.notify(ExecutionEvent::NodeCompleted {
            run_id: run_id.clone(),
            node_id: node.node_id.clone(),
            output: output.clone(),
            duration_ms,
          });

          if !condition_passed {
            let reason = format!("condition not met at {}", node.node_id);
            self.halted(node, &reason);
            halt = Some(reason);
          }

          context.insert(node.node_id.clone(), output.clone());
          results.push(NodeResult {
            node_id: node.node_id.clone(),
            node_type: node.node_type.to_string(),
            node_label: node.label.clone(),
            status: NodeStatus::Success,
            output: Some(output),
            error: None,
            reason: None,
            duration_ms,
          });
        }
        Err(e) => {
          halt = Some(self.record_failure(node, e, duration_ms, &mut results));
        }
      }
    }

    let mut record = ExecutionRecord {
      id: run_id,
      flow_id: self.flow.flow_id.clone(),
      flow_name: self.flow.name.clone(),
      started_at,
      completed_at: Utc::now(),
      wallet_address: self.env.wallet.address.clone(),
      wallet_count: self.env.wallet.wallet_count(),
      results,
      success_count: 0,
      error_count: 0,
      skipped_count: 0,
      overall_status: RunStatus::Completed,
    };
    record.tally();

    info!(
      status = ?record.overall_status,
      success = record.success_count,
      failed = record.error_count,
      skipped = record.skipped_count,
      "run_completed"
    );
    self.notifier.notify(ExecutionEvent::RunFinished {
      run_id: record.id.clone(),
      status: record.overall_status,
      success_count: record.success_count,
      error_count: record.error_count,
      skipped_count: record.skipped_count,
    });

    record
  }

  /// Execute a node in its own task so a panic fails only that node.
  ///
  /// The node is abandoned on timeout or cancellation.
  async fn dispatch(&self, node: &Node, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let task_node = node.clone();
    let task_context = context.clone();
    let task_env = self.env.clone();
    let handle =
      tokio::spawn(async move { executor::execute(&task_node, &task_context, &task_env).await });
    let abort = handle.abort_handle();

    let joined = async move {
      match handle.await {
        Ok(result) => result,
        Err(e) => Err(NodeError::Panicked(join_error_message(e))),
      }
    };

    let limited = async {
      match self.node_timeout {
        Some(limit) => tokio::time::timeout(limit, joined)
          .await
          .unwrap_or_else(|_| Err(NodeError::Timeout(limit.as_millis() as u64))),
        None => joined.await,
      }
    };

    let result = tokio::select! {
      result = limited => result,
      _ = self.cancel.cancelled() => Err(NodeError::Cancelled),
    };

    if result.is_err() {
      abort.abort();
    }
    result
  }

  /// Record a failed node and return the reason the run halts with.
  fn record_failure(
    &self,
    node: &Node,
    error: NodeError,
    duration_ms: u64,
    results: &mut Vec<NodeResult>,
  ) -> String {
    warn!(node_id = %node.node_id, error = %error, "node_failed");
    self.notifier.notify(ExecutionEvent::NodeFailed {
      run_id: self.env.run_id.clone(),
      node_id: node.node_id.clone(),
      error: error.to_string(),
    });

    let reason = match error {
      NodeError::Cancelled => "run cancelled".to_string(),
      _ => format!("halted after {} failed", node.node_id),
    };
    self.halted(node, &reason);

    results.push(NodeResult {
      node_id: node.node_id.clone(),
      node_type: node.node_type.to_string(),
      node_label: node.label.clone(),
      status: NodeStatus::Failed,
      output: None,
      error: Some(error.to_string()),
      reason: None,
      duration_ms,
    });
    reason
  }

  fn halted(&self, node: &Node, reason: &str) {
    info!(node_id = %node.node_id, reason, "run_halted");
    self.notifier.notify(ExecutionEvent::RunHalted {
      run_id: self.env.run_id.clone(),
      node_id: node.node_id.clone(),
      reason: reason.to_string(),
    });
  }
}

fn skipped(node: &Node, reason: &str) -> NodeResult {
  NodeResult {
    node_id: node.node_id.clone(),
    node_type: node.node_type.to_string(),
    node_label: node.label.clone(),
    status: NodeStatus::Skipped,
    output: None,
    error: None,
    reason: Some(reason.to_string()),
    duration_ms: 0,
  }
}

fn join_error_message(e: JoinError) -> String {
  if e.is_panic() {
    panic_message(e.into_panic())
  } else {
    e.to_string()
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}
