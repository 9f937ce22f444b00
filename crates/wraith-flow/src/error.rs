use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("edge references unknown node: from={from}, to={to}")]
  InvalidEdge { from: String, to: String },

  /// The graph is not a DAG; `nodes` are the ids that could never be ordered.
  #[error("flow contains a cycle involving: {}", nodes.join(", "))]
  Cycle { nodes: Vec<String> },
}
