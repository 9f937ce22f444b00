use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

/// A flow as exported from the canvas.
///
/// Node order is significant: it is the tie-break order used when several
/// nodes become ready at the same time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}

impl FlowDef {
  pub fn new(nodes: Vec<NodeDef>, edges: Vec<EdgeDef>) -> Self {
    Self {
      id: None,
      name: None,
      nodes,
      edges,
    }
  }
}
