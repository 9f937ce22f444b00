//! End-to-end runs through the flow engine with simulated collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wraith_config::{ConnectedWallet, FlowDef, WalletInfo, WalletType};
use wraith_engine::{
  ChannelNotifier, EngineConfig, EngineError, ExecutionEvent, FlowEngine, NodeStatus, RunStatus,
};
use wraith_flow::Flow;
use wraith_host::{Capabilities, GasPrice, HostError, PriceOracle};

fn capabilities() -> Capabilities {
  Capabilities::simulated(
    HashMap::from([
      ("ETH".to_string(), 1200.0),
      ("SOL".to_string(), 150.0),
      ("USDC".to_string(), 1.0),
    ]),
    HashMap::from([(
      "ethereum".to_string(),
      GasPrice {
        standard: 25.0,
        fast: 40.0,
      },
    )]),
  )
}

fn engine() -> FlowEngine {
  FlowEngine::new(EngineConfig::default(), capabilities())
}

fn wallet() -> WalletInfo {
  WalletInfo::new("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU", WalletType::Phantom)
}

fn flow(value: Value) -> FlowDef {
  serde_json::from_value(value).expect("valid flow json")
}

fn price_swap_alert() -> FlowDef {
  flow(json!({
    "name": "ETH watcher",
    "nodes": [
      { "id": "p", "type": "priceCheck", "data": { "token": "ETH", "threshold": 1000, "direction": "above" } },
      { "id": "s", "type": "swap", "data": { "fromToken": "SOL", "toToken": "USDC", "amount": 0.5 } },
      { "id": "a", "type": "alert", "data": { "alertType": "webhook", "message": "swapped" } }
    ],
    "edges": [
      { "source": "p", "target": "s" },
      { "source": "s", "target": "a" }
    ]
  }))
}

fn statuses(record: &wraith_engine::ExecutionRecord) -> Vec<(&str, NodeStatus)> {
  record
    .results
    .iter()
    .map(|r| (r.node_id.as_str(), r.status))
    .collect()
}

#[tokio::test]
async fn test_linear_flow_succeeds() {
  let engine = engine();
  let record = engine
    .start_run(price_swap_alert(), wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(
    statuses(&record),
    vec![
      ("p", NodeStatus::Success),
      ("s", NodeStatus::Success),
      ("a", NodeStatus::Success)
    ]
  );
  assert_eq!(record.success_count, 3);
  assert_eq!(record.error_count, 0);
  assert_eq!(record.overall_status, RunStatus::Completed);
  assert_eq!(record.flow_name, "ETH watcher");
  assert_eq!(record.wallet_count, 1);

  let price = record.result("p").unwrap();
  assert_eq!(price.node_label, "Price Check");
  assert_eq!(price.node_type, "priceCheck");
  let output = price.output.as_ref().unwrap();
  assert_eq!(output["price"], 1200.0);
  assert_eq!(output["conditionMet"], true);
}

#[tokio::test]
async fn test_unmet_condition_skips_downstream() {
  let def = flow(json!({
    "nodes": [
      { "id": "c", "type": "condition", "data": { "conditionType": "price", "token": "ETH", "operator": ">", "value": 5000 } },
      { "id": "s", "type": "swap", "data": {} }
    ],
    "edges": [{ "source": "c", "target": "s" }]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(
    statuses(&record),
    vec![("c", NodeStatus::Success), ("s", NodeStatus::Skipped)]
  );
  assert_eq!(record.result("c").unwrap().output.as_ref().unwrap()["passed"], false);
  assert_eq!(
    record.result("s").unwrap().reason.as_deref(),
    Some("condition not met at c")
  );
  assert_eq!(record.overall_status, RunStatus::Completed);
  assert_eq!(record.skipped_count, 1);
}

#[tokio::test]
async fn test_failure_halts_remaining_nodes() {
  let def = flow(json!({
    "nodes": [
      { "id": "p", "type": "priceCheck", "data": { "token": "NOPE" } },
      { "id": "s", "type": "swap", "data": {} },
      { "id": "a", "type": "alert", "data": {} }
    ],
    "edges": [
      { "source": "p", "target": "s" },
      { "source": "s", "target": "a" }
    ]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(
    statuses(&record),
    vec![
      ("p", NodeStatus::Failed),
      ("s", NodeStatus::Skipped),
      ("a", NodeStatus::Skipped)
    ]
  );
  assert!(record.result("p").unwrap().error.as_deref().unwrap().contains("NOPE"));
  assert_eq!(
    record.result("a").unwrap().reason.as_deref(),
    Some("halted after p failed")
  );
  assert_eq!(record.overall_status, RunStatus::Failed);
  assert_eq!(record.error_count, 1);
  assert_eq!(record.skipped_count, 2);
}

#[tokio::test]
async fn test_unknown_node_type_fails_node() {
  let def = flow(json!({
    "nodes": [
      { "id": "t", "type": "trigger", "data": {} },
      { "id": "x", "type": "teleport", "data": {} }
    ],
    "edges": [{ "source": "t", "target": "x" }]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  let x = record.result("x").unwrap();
  assert_eq!(x.status, NodeStatus::Failed);
  assert_eq!(x.node_type, "teleport");
  assert!(x.error.as_deref().unwrap().contains("unsupported node type"));
  assert_eq!(record.overall_status, RunStatus::Failed);
}

#[tokio::test]
async fn test_rejected_runs_are_not_recorded() {
  let engine = engine();

  let err = engine
    .start_run(FlowDef::default(), wallet(), CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Validation { .. }));

  let err = engine
    .start_run(
      price_swap_alert(),
      WalletInfo::new("  ", WalletType::Phantom),
      CancellationToken::new(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Validation { .. }));

  let cyclic = flow(json!({
    "nodes": [
      { "id": "a", "type": "alert", "data": {} },
      { "id": "b", "type": "alert", "data": {} }
    ],
    "edges": [
      { "source": "a", "target": "b" },
      { "source": "b", "target": "a" }
    ]
  }));
  let err = engine
    .start_run(cyclic, wallet(), CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Cycle(_)));

  let dangling = flow(json!({
    "nodes": [{ "id": "a", "type": "alert", "data": {} }],
    "edges": [{ "source": "a", "target": "ghost" }]
  }));
  let err = engine
    .start_run(dangling, wallet(), CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Validation { .. }));

  assert!(engine.list_recent_runs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_diamond_runs_in_definition_order() {
  let def = flow(json!({
    "nodes": [
      { "id": "t", "type": "trigger", "data": {} },
      { "id": "left", "type": "alert", "data": {} },
      { "id": "right", "type": "alert", "data": {} },
      { "id": "join", "type": "alert", "data": {} }
    ],
    "edges": [
      { "source": "t", "target": "left" },
      { "source": "t", "target": "right" },
      { "source": "left", "target": "join" },
      { "source": "right", "target": "join" }
    ]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  let order: Vec<_> = record.results.iter().map(|r| r.node_id.as_str()).collect();
  assert_eq!(order, vec!["t", "left", "right", "join"]);
  assert_eq!(record.success_count, 4);
}

#[tokio::test]
async fn test_runs_are_repeatable() {
  let def = flow(json!({
    "nodes": [
      { "id": "p", "type": "priceCheck", "data": { "token": "SOL" } },
      { "id": "c", "type": "condition", "data": { "token": "SOL", "operator": "<", "value": 200 } },
      { "id": "s", "type": "swap", "data": { "fromToken": "SOL", "amount": 1 } },
      { "id": "a", "type": "alert", "data": { "message": "bought {{ s.amountUsd | int }} USD" } }
    ],
    "edges": [
      { "source": "p", "target": "c" },
      { "source": "c", "target": "s" },
      { "source": "s", "target": "a" }
    ]
  }));
  let engine = engine();

  let first = engine
    .start_run(def.clone(), wallet(), CancellationToken::new())
    .await
    .unwrap();
  let second = engine
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_ne!(first.id, second.id);
  assert_eq!(first.success_count, 4);
  for (a, b) in first.results.iter().zip(&second.results) {
    assert_eq!(a.node_id, b.node_id);
    assert_eq!(a.status, b.status);
    assert_eq!(a.output, b.output);
  }

  let swap = first.result("s").unwrap().output.clone().unwrap();
  assert_eq!(swap["amountUsd"], 150.0);
  let alert = first.result("a").unwrap().output.clone().unwrap();
  assert_eq!(alert["message"], "bought 150 USD");
  assert_eq!(
    first.result("c").unwrap().output.as_ref().unwrap()["valueSource"],
    "context:p"
  );
}

struct PanickingOracle;

#[async_trait]
impl PriceOracle for PanickingOracle {
  async fn get_price(&self, _symbol: &str) -> Result<Option<f64>, HostError> {
    panic!("oracle exploded");
  }
}

#[tokio::test]
async fn test_panicking_collaborator_fails_only_its_node() {
  let engine = FlowEngine::new(
    EngineConfig::default(),
    capabilities().with_prices(Arc::new(PanickingOracle)),
  );

  let record = engine
    .start_run(price_swap_alert(), wallet(), CancellationToken::new())
    .await
    .unwrap();

  let p = record.result("p").unwrap();
  assert_eq!(p.status, NodeStatus::Failed);
  assert!(p.error.as_deref().unwrap().contains("oracle exploded"));
  assert_eq!(record.skipped_count, 2);

  // The engine is still usable afterwards.
  let def = flow(json!({ "nodes": [{ "id": "a", "type": "alert", "data": {} }] }));
  let record = engine
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();
  assert_eq!(record.overall_status, RunStatus::Completed);
}

#[tokio::test]
async fn test_history_is_bounded_and_most_recent_first() {
  let config = EngineConfig {
    history_capacity: 2,
    ..EngineConfig::default()
  };
  let engine = FlowEngine::new(config, capabilities());

  let mut ids = Vec::new();
  for _ in 0..3 {
    let record = engine
      .start_run(price_swap_alert(), wallet(), CancellationToken::new())
      .await
      .unwrap();
    ids.push(record.id);
  }

  let listed: Vec<_> = engine
    .list_recent_runs()
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.id)
    .collect();
  assert_eq!(listed, vec![ids[2].clone(), ids[1].clone()]);

  assert!(engine.get_run(&ids[0]).await.unwrap().is_none());
  let fetched = engine.get_run(&ids[2]).await.unwrap().unwrap();
  assert_eq!(fetched.success_count, 3);
}

#[tokio::test]
async fn test_multi_wallet_run() {
  let wallets: Vec<_> = ["0xaaaaaaaaaa", "0xbbbbbbbbbb", "0xcccccccccc"]
    .iter()
    .map(|a| ConnectedWallet {
      address: a.to_string(),
      wallet_type: WalletType::Rabby,
      label: None,
    })
    .collect();
  let wallet = WalletInfo::new("0xaaaaaaaaaa", WalletType::Rabby).with_wallets(wallets);

  let def = flow(json!({
    "nodes": [{ "id": "m", "type": "multiWallet", "data": { "executeSequentially": true } }]
  }));
  let record = engine()
    .start_run(def, wallet, CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(record.wallet_count, 3);
  let output = record.result("m").unwrap().output.clone().unwrap();
  assert_eq!(output["walletCount"], 3);
  assert_eq!(output["mode"], "sequential");
}

#[tokio::test]
async fn test_cancelled_before_start() {
  let cancel = CancellationToken::new();
  cancel.cancel();

  let record = engine()
    .start_run(price_swap_alert(), wallet(), cancel)
    .await
    .unwrap();

  let p = record.result("p").unwrap();
  assert_eq!(p.status, NodeStatus::Failed);
  assert_eq!(p.error.as_deref(), Some("run cancelled"));
  assert_eq!(
    record.result("s").unwrap().reason.as_deref(),
    Some("run cancelled")
  );
  assert_eq!(record.overall_status, RunStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_wait() {
  let def = flow(json!({
    "nodes": [
      { "id": "w", "type": "waitDelay", "data": { "duration": 60, "unit": "seconds" } },
      { "id": "a", "type": "alert", "data": {} }
    ],
    "edges": [{ "source": "w", "target": "a" }]
  }));
  let cancel = CancellationToken::new();
  let trigger = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(100)).await;
    trigger.cancel();
  });

  let record = engine().start_run(def, wallet(), cancel).await.unwrap();

  assert_eq!(
    statuses(&record),
    vec![("w", NodeStatus::Failed), ("a", NodeStatus::Skipped)]
  );
  assert_eq!(record.result("w").unwrap().error.as_deref(), Some("run cancelled"));
}

#[tokio::test(start_paused = true)]
async fn test_node_timeout() {
  let config = EngineConfig {
    node_timeout: Some(Duration::from_secs(1)),
    ..EngineConfig::default()
  };
  let engine = FlowEngine::new(config, capabilities());
  let def = flow(json!({
    "nodes": [{ "id": "w", "type": "waitDelay", "data": { "duration": 30 } }]
  }));

  let record = engine
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  let w = record.result("w").unwrap();
  assert_eq!(w.status, NodeStatus::Failed);
  assert_eq!(w.error.as_deref(), Some("node timed out after 1000 ms"));
}

#[tokio::test(start_paused = true)]
async fn test_wait_is_capped_by_config() {
  let config = EngineConfig {
    max_wait: Some(Duration::from_secs(10)),
    ..EngineConfig::default()
  };
  let engine = FlowEngine::new(config, capabilities());
  let def = flow(json!({
    "nodes": [{ "id": "w", "type": "waitDelay", "data": { "duration": 2, "unit": "hours" } }]
  }));

  let record = engine
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  let output = record.result("w").unwrap().output.clone().unwrap();
  assert_eq!(output["capped"], true);
  assert_eq!(output["waited"], 10.0);
}

#[tokio::test]
async fn test_execute_single_node() {
  let def = flow(json!({
    "nodes": [
      { "id": "p", "type": "priceCheck", "data": { "token": "ETH" } },
      { "id": "a", "type": "alert", "data": { "message": "price {{ p.price }}" } }
    ],
    "edges": [{ "source": "p", "target": "a" }]
  }));
  let engine = engine();
  let flow = Flow::from_def(def).unwrap();

  let result = engine
    .execute_node(
      &flow,
      "a",
      json!({ "p": { "price": 42 } }),
      &wallet(),
      CancellationToken::new(),
    )
    .await
    .unwrap();

  assert_eq!(result.status, NodeStatus::Success);
  assert_eq!(result.output.unwrap()["message"], "price 42");
  assert!(engine.list_recent_runs().await.unwrap().is_empty());

  let err = engine
    .execute_node(&flow, "missing", Value::Null, &wallet(), CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn test_events_are_streamed() {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let engine = FlowEngine::with_notifier(
    EngineConfig::default(),
    capabilities(),
    ChannelNotifier::new(tx),
  );
  let def = flow(json!({
    "nodes": [
      { "id": "c", "type": "condition", "data": { "operator": ">", "value": 99999 } },
      { "id": "a", "type": "alert", "data": {} }
    ],
    "edges": [{ "source": "c", "target": "a" }]
  }));

  let record = engine
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();
  drop(engine);

  let mut events = Vec::new();
  while let Some(event) = rx.recv().await {
    events.push(event);
  }

  assert!(matches!(events.first(), Some(ExecutionEvent::RunStarted { node_count: 2, .. })));
  assert!(events.iter().any(|e| matches!(
    e,
    ExecutionEvent::RunHalted { node_id, .. } if node_id == "c"
  )));
  assert!(events.iter().any(|e| matches!(
    e,
    ExecutionEvent::NodeSkipped { node_id, .. } if node_id == "a"
  )));
  match events.last() {
    Some(ExecutionEvent::RunFinished {
      run_id,
      status,
      skipped_count,
      ..
    }) => {
      assert_eq!(run_id, &record.id);
      assert_eq!(*status, RunStatus::Completed);
      assert_eq!(*skipped_count, 1);
    }
    other => panic!("unexpected last event: {:?}", other),
  }
}

#[tokio::test]
async fn test_results_follow_execution_order() {
  let def = flow(json!({
    "nodes": [
      { "id": "a", "type": "alert", "data": { "message": "done" } },
      { "id": "s", "type": "swap", "data": { "fromToken": "SOL", "toToken": "USDC", "amount": 1 } },
      { "id": "p", "type": "priceCheck", "data": { "token": "SOL" } }
    ],
    "edges": [
      { "source": "p", "target": "s" },
      { "source": "s", "target": "a" }
    ]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(
    statuses(&record),
    vec![
      ("p", NodeStatus::Success),
      ("s", NodeStatus::Success),
      ("a", NodeStatus::Success)
    ]
  );
  let swap = record.result("s").unwrap().output.clone().unwrap();
  assert_eq!(swap["amountUsd"], 150.0);
}

#[tokio::test]
async fn test_trigger_price_check_alert() {
  let def = flow(json!({
    "nodes": [
      { "id": "t", "type": "trigger", "data": {} },
      { "id": "p", "type": "priceCheck", "data": { "token": "ETH", "threshold": 1000, "direction": "above" } },
      { "id": "a", "type": "alert", "data": { "message": "ETH above 1000" } }
    ],
    "edges": [
      { "source": "t", "target": "p" },
      { "source": "p", "target": "a" }
    ]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  let price = record.result("p").unwrap().output.clone().unwrap();
  assert_eq!(price["conditionMet"], true);
  assert_eq!(record.result("a").unwrap().status, NodeStatus::Success);
  assert_eq!(record.overall_status, RunStatus::Completed);
  assert_eq!(record.success_count, 3);
}

#[tokio::test]
async fn test_trigger_condition_swap_halts() {
  let def = flow(json!({
    "nodes": [
      { "id": "t", "type": "trigger", "data": {} },
      { "id": "c", "type": "condition", "data": { "conditionType": "price", "token": "ETH", "operator": ">", "value": 5000 } },
      { "id": "s", "type": "swap", "data": {} }
    ],
    "edges": [
      { "source": "t", "target": "c" },
      { "source": "c", "target": "s" }
    ]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(
    statuses(&record),
    vec![
      ("t", NodeStatus::Success),
      ("c", NodeStatus::Success),
      ("s", NodeStatus::Skipped)
    ]
  );
  assert_eq!(record.result("c").unwrap().output.as_ref().unwrap()["passed"], false);
  assert_eq!(record.overall_status, RunStatus::Completed);
  assert_eq!(record.skipped_count, 1);
}

#[tokio::test]
async fn test_lend_stake_actions_complete_the_run() {
  let def = flow(json!({
    "nodes": [
      { "id": "t", "type": "trigger", "data": {} },
      { "id": "u", "type": "lendStake", "data": { "actionType": "unstake", "amount": "100" } },
      { "id": "d", "type": "lendStake", "data": { "actionType": "deposit", "protocol": "aave", "token": "USDC", "amount": "all" } },
      { "id": "a", "type": "alert", "data": { "message": "rebalanced" } }
    ],
    "edges": [
      { "source": "t", "target": "u" },
      { "source": "u", "target": "d" },
      { "source": "d", "target": "a" }
    ]
  }));

  let record = engine()
    .start_run(def, wallet(), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(record.overall_status, RunStatus::Completed);
  assert_eq!(record.success_count, 4);
  let deposit = record.result("d").unwrap().output.clone().unwrap();
  assert_eq!(deposit["amount"], "all");
  assert!(deposit["amountUsd"].is_null());
}
