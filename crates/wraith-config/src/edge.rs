use serde::{Deserialize, Serialize};

/// A directed dependency between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDef {
  pub source: String,
  pub target: String,
  /// Output handle on the source node (e.g. a condition's `"true"` / `"false"`).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
}

impl EdgeDef {
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      target: target.into(),
      source_handle: None,
    }
  }
}
