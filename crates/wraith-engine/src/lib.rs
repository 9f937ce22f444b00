//! Wraith Flow Engine
//!
//! This crate executes automation flows: it orders the nodes of a flow,
//! runs them one by one on behalf of a wallet, stops at the first failure or
//! unmet condition, and keeps a bounded history of finished runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FlowEngine                           │
//! │  - start_run(flow, wallet, cancel) → ExecutionRecord        │
//! │  - validation, ordering, run history                        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ExecutionCoordinator                      │
//! │  - sequential traversal, halt policy                        │
//! │  - per-node timeout, cancellation, panic containment        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      node executors                         │
//! │  - parameter templating via minijinja                       │
//! │  - one executor per node type, backed by Capabilities       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wraith_engine::{EngineConfig, FlowEngine};
//! use wraith_host::Capabilities;
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = FlowEngine::new(EngineConfig::default(), Capabilities::simulated(prices, gas));
//! let record = engine.start_run(flow_def, wallet, CancellationToken::new()).await?;
//! println!("{:?}: {} ok, {} failed", record.overall_status, record.success_count, record.error_count);
//! ```

mod config;
mod context;
mod coordinator;
mod engine;
mod error;
mod events;
mod executor;
mod input;

pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use engine::FlowEngine;
pub use error::{EngineError, NodeError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use executor::{NodeEnv, NodeOutcome, Operator, execute};
pub use input::render_params;

pub use wraith_store::{ExecutionRecord, NodeResult, NodeStatus, RunStatus};
