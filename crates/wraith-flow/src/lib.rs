//! Wraith Flow
//!
//! This crate provides the "locked" flow representation for wraith.
//! A locked flow is a validated form of a flow definition that is ready for
//! execution.
//!
//! Key differences from `wraith-config`:
//! - Node ids are unique and every edge references an existing node
//! - Each node carries its resolved display label
//! - The graph can be ordered deterministically for a sequential run

mod error;
mod flow;
mod graph;

pub use error::FlowError;
pub use flow::{Edge, Flow, Node};
pub use graph::Graph;
