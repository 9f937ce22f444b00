use std::collections::{HashMap, VecDeque};

use crate::error::FlowError;
use crate::flow::{Edge, Node};

/// Graph structure for traversal and ordering.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in insertion order.
  nodes: Vec<String>,
  /// Adjacency list: node_id -> list of downstream node_ids, in edge order.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node_id -> list of upstream node_ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Nodes with no incoming edges, in insertion order.
  entry_points: Vec<String>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  ///
  /// Edges are expected to reference known nodes; `Flow::from_def` enforces this.
  pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    for node in nodes {
      adjacency.entry(node.node_id.clone()).or_default();
      reverse_adjacency.entry(node.node_id.clone()).or_default();
    }

    for edge in edges {
      adjacency
        .entry(edge.source.clone())
        .or_default()
        .push(edge.target.clone());
      reverse_adjacency
        .entry(edge.target.clone())
        .or_default()
        .push(edge.source.clone());
    }

    let entry_points: Vec<String> = nodes
      .iter()
      .map(|n| &n.node_id)
      .filter(|id| reverse_adjacency.get(*id).is_none_or(|v| v.is_empty()))
      .cloned()
      .collect();

    Self {
      nodes: nodes.iter().map(|n| n.node_id.clone()).collect(),
      adjacency,
      reverse_adjacency,
      entry_points,
    }
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream nodes for a given node.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Compute a deterministic execution order (Kahn's algorithm).
  ///
  /// The ready queue is seeded with the entry points in insertion order;
  /// successors are enqueued in edge order as their in-degree reaches zero.
  /// Fails with [`FlowError::Cycle`] if some nodes can never become ready.
  pub fn execution_order(&self) -> Result<Vec<String>, FlowError> {
    let mut in_degree: HashMap<&str, usize> = self
      .nodes
      .iter()
      .map(|id| (id.as_str(), self.upstream(id).len()))
      .collect();

    let mut queue: VecDeque<&str> = self.entry_points.iter().map(String::as_str).collect();

    let mut order = Vec::with_capacity(self.nodes.len());

    while let Some(current) = queue.pop_front() {
      order.push(current.to_string());

      for next in self.downstream(current) {
        if let Some(degree) = in_degree.get_mut(next.as_str()) {
          *degree = degree.saturating_sub(1);
          if *degree == 0 {
            queue.push_back(next.as_str());
          }
        }
      }
    }

    if order.len() < self.nodes.len() {
      let stuck = self
        .nodes
        .iter()
        .filter(|id| in_degree.get(id.as_str()).is_some_and(|d| *d > 0))
        .cloned()
        .collect();
      return Err(FlowError::Cycle { nodes: stuck });
    }

    Ok(order)
  }
}
