//! Wraith Config
//!
//! This crate contains the serializable flow configuration types for wraith.
//! These types mirror the graph a user assembles on the canvas: typed action
//! nodes carrying an open bag of parameters, and directed edges between them.
//!
//! Configuration can be loaded from:
//! - JSON files exported from the canvas (via the CLI)
//! - Request bodies handed to the engine by a caller
//!
//! The flow crate validates these definitions and locks them into a `Flow`
//! that the engine can execute.

mod edge;
mod flow;
mod input;
mod node;
mod wallet;

pub use edge::EdgeDef;
pub use flow::FlowDef;
pub use input::NodeData;
pub use node::{NodeDef, NodeType};
pub use wallet::{ConnectedWallet, WalletInfo, WalletType};
