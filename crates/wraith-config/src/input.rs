//! Parameter values for flow node configuration.
//!
//! Node parameters are stored exactly as the canvas saved them: an ordered
//! map of named JSON values. Numbers are frequently stored as strings
//! (`"amount": "0.5"`), so consumers parse them leniently.
//!
//! String values may contain minijinja templates that are rendered against
//! the run context right before the node executes.
//!
//! # Examples
//!
//! ```json
//! {
//!   "label": "Buy the dip",
//!   "fromToken": "USDC",
//!   "toToken": "SOL",
//!   "amount": "25",
//!   "slippage": 0.5,
//!   "message": "SOL is at {{ nodes[\"price-1\"].price }}"
//! }
//! ```

/// The parameter bag of a node.
pub type NodeData = serde_json::Map<String, serde_json::Value>;
