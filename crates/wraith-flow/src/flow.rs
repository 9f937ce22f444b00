use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wraith_config::{EdgeDef, FlowDef, NodeData, NodeDef, NodeType};

use crate::error::FlowError;
use crate::graph::Graph;

/// A node of a locked flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub node_id: String,
  pub node_type: NodeType,
  pub label: String,
  pub data: NodeData,
}

impl Node {
  pub fn new(node_id: impl Into<String>, node_type: NodeType, data: NodeData) -> Self {
    NodeDef::new(node_id, node_type, data).into()
  }
}

impl From<NodeDef> for Node {
  fn from(def: NodeDef) -> Self {
    let label = def.label();
    Self {
      node_id: def.id,
      node_type: def.node_type,
      label,
      data: def.data,
    }
  }
}

/// A directed edge of a locked flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub source: String,
  pub target: String,
  /// Retained for reporting; routing treats every edge as unconditional.
  pub source_handle: Option<String>,
}

impl Edge {
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      target: target.into(),
      source_handle: None,
    }
  }
}

impl From<EdgeDef> for Edge {
  fn from(def: EdgeDef) -> Self {
    Self {
      source: def.source,
      target: def.target,
      source_handle: def.source_handle,
    }
  }
}

/// A locked flow ready for execution.
///
/// Node ids are unique and every edge references an existing node. Nodes keep
/// the order they were defined in.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
  pub flow_id: String,
  pub name: String,
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
  index: HashMap<String, usize>,
}

impl Flow {
  /// Validate a flow definition and lock it.
  pub fn from_def(def: FlowDef) -> Result<Self, FlowError> {
    let mut index = HashMap::with_capacity(def.nodes.len());
    let mut nodes = Vec::with_capacity(def.nodes.len());

    for node_def in def.nodes {
      if index.contains_key(&node_def.id) {
        return Err(FlowError::DuplicateNode(node_def.id));
      }
      index.insert(node_def.id.clone(), nodes.len());
      nodes.push(Node::from(node_def));
    }

    for edge in &def.edges {
      if !index.contains_key(&edge.source) || !index.contains_key(&edge.target) {
        return Err(FlowError::InvalidEdge {
          from: edge.source.clone(),
          to: edge.target.clone(),
        });
      }
    }

    Ok(Self {
      flow_id: def
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
      name: def.name.unwrap_or_else(|| "Untitled Flow".to_string()),
      nodes,
      edges: def.edges.into_iter().map(Edge::from).collect(),
      index,
    })
  }

  /// Build the graph structure for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.nodes, &self.edges)
  }

  /// Compute the execution order of this flow.
  pub fn execution_order(&self) -> Result<Vec<String>, FlowError> {
    self.graph().execution_order()
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.index.get(node_id).map(|i| &self.nodes[*i])
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}
