//! Flow execution engine.
//!
//! The `FlowEngine` validates and orders a flow, hands it to the coordinator
//! and keeps the bounded run history.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wraith_config::{FlowDef, WalletInfo};
use wraith_flow::Flow;
use wraith_host::Capabilities;
use wraith_store::{ExecutionRecord, ExecutionStore, MemoryStore, NodeResult};

use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::coordinator::ExecutionCoordinator;
use crate::error::EngineError;
use crate::events::{ExecutionNotifier, NoopNotifier};
use crate::executor::NodeEnv;

/// The flow execution engine.
///
/// Generic over `N: ExecutionNotifier` to allow different notification strategies.
/// Use `FlowEngine::new()` for an engine with no-op notifications, or
/// `FlowEngine::with_notifier()` to observe runs as they progress.
pub struct FlowEngine<N: ExecutionNotifier = NoopNotifier> {
  config: EngineConfig,
  capabilities: Capabilities,
  store: Arc<dyn ExecutionStore>,
  notifier: N,
}

impl FlowEngine<NoopNotifier> {
  pub fn new(config: EngineConfig, capabilities: Capabilities) -> Self {
    Self::with_notifier(config, capabilities, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> FlowEngine<N> {
  /// Create an engine with a custom notifier and an in-memory history.
  pub fn with_notifier(config: EngineConfig, capabilities: Capabilities, notifier: N) -> Self {
    let store = Arc::new(MemoryStore::with_capacity(config.history_capacity));
    Self {
      config,
      capabilities,
      store,
      notifier,
    }
  }

  /// Replace the run history.
  pub fn with_store(mut self, store: Arc<dyn ExecutionStore>) -> Self {
    self.store = store;
    self
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn capabilities(&self) -> &Capabilities {
    &self.capabilities
  }

  /// Validate a submitted flow and the wallet, then lock the flow.
  pub fn prepare(&self, def: FlowDef, wallet: &WalletInfo) -> Result<Flow, EngineError> {
    if def.nodes.is_empty() {
      return Err(EngineError::validation("flow has no nodes"));
    }
    if !wallet.is_usable() {
      return Err(EngineError::validation("a wallet address is required"));
    }
    Ok(Flow::from_def(def)?)
  }

  /// Execute a locked flow without recording it in the history.
  ///
  /// Errors only when the run cannot start. Node failures are reported in
  /// the returned record.
  pub async fn run(
    &self,
    flow: &Flow,
    wallet: &WalletInfo,
    cancel: CancellationToken,
  ) -> Result<ExecutionRecord, EngineError> {
    if flow.is_empty() {
      return Err(EngineError::validation("flow has no nodes"));
    }
    if !wallet.is_usable() {
      return Err(EngineError::validation("a wallet address is required"));
    }

    let order = flow.execution_order()?;
    let coordinator = ExecutionCoordinator {
      flow,
      order,
      env: self.node_env(wallet),
      notifier: &self.notifier,
      node_timeout: self.config.node_timeout,
      cancel,
    };
    Ok(coordinator.run(ExecutionContext::new()).await)
  }

  /// Validate, execute and record a submitted flow.
  pub async fn start_run(
    &self,
    def: FlowDef,
    wallet: WalletInfo,
    cancel: CancellationToken,
  ) -> Result<ExecutionRecord, EngineError> {
    let flow = self.prepare(def, &wallet).inspect_err(|e| {
      warn!(error = %e, "flow rejected");
    })?;

    let record = self.run(&flow, &wallet, cancel).await.inspect_err(|e| {
      warn!(flow_id = %flow.flow_id, error = %e, "flow rejected");
    })?;

    self.store.append(record.clone()).await?;
    info!(run_id = %record.id, status = ?record.overall_status, "run recorded");
    Ok(record)
  }

  /// Execute a single node of a locked flow against a caller-supplied context.
  ///
  /// The payload is an object of `{ node_id: output }` entries; any other
  /// value is visible to templates as `trigger`. The result is not recorded.
  pub async fn execute_node(
    &self,
    flow: &Flow,
    node_id: &str,
    payload: serde_json::Value,
    wallet: &WalletInfo,
    cancel: CancellationToken,
  ) -> Result<NodeResult, EngineError> {
    if flow.get_node(node_id).is_none() {
      return Err(EngineError::validation(format!(
        "node '{}' not found in flow",
        node_id
      )));
    }
    if !wallet.is_usable() {
      return Err(EngineError::validation("a wallet address is required"));
    }

    let coordinator = ExecutionCoordinator {
      flow,
      order: vec![node_id.to_string()],
      env: self.node_env(wallet),
      notifier: &self.notifier,
      node_timeout: self.config.node_timeout,
      cancel,
    };
    let record = coordinator
      .run(ExecutionContext::from_value(payload))
      .await;

    record
      .results
      .into_iter()
      .next()
      .ok_or_else(|| EngineError::validation(format!("node '{}' did not run", node_id)))
  }

  pub async fn get_run(&self, run_id: &str) -> Result<Option<ExecutionRecord>, EngineError> {
    Ok(self.store.get(run_id).await?)
  }

  /// Retained runs, most recent first.
  pub async fn list_recent_runs(&self) -> Result<Vec<ExecutionRecord>, EngineError> {
    Ok(self.store.list().await?)
  }

  fn node_env(&self, wallet: &WalletInfo) -> NodeEnv {
    NodeEnv {
      run_id: uuid::Uuid::new_v4().to_string(),
      wallet: Arc::new(wallet.clone()),
      capabilities: self.capabilities.clone(),
      max_wait: self.config.max_wait,
    }
  }
}
