use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall status of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Completed,
  Failed,
}

/// Final status of a node within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
  Success,
  Failed,
  Skipped,
}

/// The outcome of one node in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
  pub node_id: String,
  pub node_type: String,
  pub node_label: String,
  pub status: NodeStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  /// Why the node did not run (only set for skipped nodes).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  pub duration_ms: u64,
}

/// A completed run as kept in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
  pub id: String,
  pub flow_id: String,
  pub flow_name: String,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
  pub wallet_address: String,
  pub wallet_count: usize,
  /// Node results in execution order.
  pub results: Vec<NodeResult>,
  pub success_count: usize,
  pub error_count: usize,
  pub skipped_count: usize,
  pub overall_status: RunStatus,
}

impl ExecutionRecord {
  /// Recompute the aggregate counts and overall status from `results`.
  pub fn tally(&mut self) {
    let (mut success, mut failed, mut skipped) = (0, 0, 0);
    for result in &self.results {
      match result.status {
        NodeStatus::Success => success += 1,
        NodeStatus::Failed => failed += 1,
        NodeStatus::Skipped => skipped += 1,
      }
    }
    self.success_count = success;
    self.error_count = failed;
    self.skipped_count = skipped;
    self.overall_status = if self.error_count > 0 {
      RunStatus::Failed
    } else {
      RunStatus::Completed
    };
  }

  pub fn result(&self, node_id: &str) -> Option<&NodeResult> {
    self.results.iter().find(|r| r.node_id == node_id)
  }

  pub fn duration_ms(&self) -> i64 {
    (self.completed_at - self.started_at).num_milliseconds()
  }
}
