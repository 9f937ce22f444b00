use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use wraith_config::{NodeData, WalletType};
use wraith_host::token::truncate_address;

use super::params::{self, opt_bool, opt_string, opt_u64};
use super::{NodeEnv, NodeOutcome};
use crate::error::NodeError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerParams {
  #[serde(default, deserialize_with = "opt_string")]
  schedule_type: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  schedule_time: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  cron_expression: Option<String>,
}

pub(super) fn trigger(data: &NodeData) -> Result<NodeOutcome, NodeError> {
  let p: TriggerParams = params::parse(data)?;
  Ok(NodeOutcome::success(json!({
    "triggered": true,
    "scheduleType": p.schedule_type.unwrap_or_else(|| "manual".to_string()),
    "scheduleTime": p.schedule_time,
    "cronExpression": p.cron_expression,
    "triggeredAt": Utc::now().to_rfc3339(),
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoopParams {
  #[serde(default, deserialize_with = "opt_u64")]
  iterations: Option<u64>,
  #[serde(default, deserialize_with = "opt_bool")]
  infinite: Option<bool>,
  #[serde(default, deserialize_with = "opt_string")]
  break_condition: Option<String>,
}

/// Loops are recorded, not repeated: the flow body still runs once.
pub(super) fn loop_node(data: &NodeData) -> Result<NodeOutcome, NodeError> {
  let p: LoopParams = params::parse(data)?;
  let iterations = match (p.infinite.unwrap_or(false), p.iterations) {
    (true, _) => json!("infinite"),
    (false, n) => json!(n.unwrap_or(1)),
  };
  Ok(NodeOutcome::success(json!({
    "iterations": iterations,
    "breakCondition": p.break_condition,
    "looped": true,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainSwitchParams {
  #[serde(default, deserialize_with = "opt_string")]
  target_chain: Option<String>,
}

pub(super) fn chain_switch(data: &NodeData) -> Result<NodeOutcome, NodeError> {
  let p: ChainSwitchParams = params::parse(data)?;
  let chain = p
    .target_chain
    .ok_or_else(|| NodeError::InvalidParams("targetChain is required".to_string()))?;
  Ok(NodeOutcome::success(json!({
    "targetChain": chain,
    "switched": true,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletConnectParams {
  #[serde(default)]
  wallet_type: Option<WalletType>,
}

pub(super) fn wallet_connect(data: &NodeData, env: &NodeEnv) -> Result<NodeOutcome, NodeError> {
  let p: WalletConnectParams = params::parse(data)?;
  Ok(NodeOutcome::success(json!({
    "walletType": p.wallet_type.unwrap_or(env.wallet.wallet_type),
    "address": env.wallet.address,
    "connected": true,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultiWalletParams {
  #[serde(default)]
  wallets: Vec<String>,
  #[serde(default, deserialize_with = "opt_bool")]
  execute_sequentially: Option<bool>,
}

/// Report which wallets the flow would fan out to.
///
/// The run itself still executes once, on behalf of the primary wallet.
pub(super) fn multi_wallet(data: &NodeData, env: &NodeEnv) -> Result<NodeOutcome, NodeError> {
  let p: MultiWalletParams = params::parse(data)?;

  let queued: Vec<Value> = if !env.wallet.all_wallets.is_empty() {
    env
      .wallet
      .all_wallets
      .iter()
      .map(|w| queued_entry(&w.address, w.label.as_deref(), Some(w.wallet_type)))
      .collect()
  } else if !p.wallets.is_empty() {
    p.wallets
      .iter()
      .map(|address| queued_entry(address, None, None))
      .collect()
  } else {
    vec![queued_entry(&env.wallet.address, None, Some(env.wallet.wallet_type))]
  };

  let mode = if p.execute_sequentially.unwrap_or(false) {
    "sequential"
  } else {
    "parallel"
  };

  let wallets: Vec<String> = queued
    .iter()
    .take(3)
    .filter_map(|entry| entry["address"].as_str())
    .map(truncate_address)
    .collect();

  Ok(NodeOutcome::success(json!({
    "walletCount": queued.len(),
    "mode": mode,
    "wallets": wallets,
    "queued": queued,
  })))
}

fn queued_entry(address: &str, label: Option<&str>, wallet_type: Option<WalletType>) -> Value {
  json!({
    "address": address,
    "label": label,
    "walletType": wallet_type,
    "status": "queued",
  })
}

#[cfg(test)]
mod tests {
  use super::super::test_support::*;
  use super::*;
  use std::sync::Arc;
  use wraith_config::{ConnectedWallet, WalletInfo};

  #[test]
  fn test_trigger_defaults_to_manual() {
    let out = trigger(&data(json!({}))).unwrap();
    assert_eq!(out.output["triggered"], true);
    assert_eq!(out.output["scheduleType"], "manual");
    assert!(out.output["triggeredAt"].is_string());
  }

  #[test]
  fn test_loop_reports_iterations() {
    let out = loop_node(&data(json!({ "iterations": "5" }))).unwrap();
    assert_eq!(out.output["iterations"], 5);

    let out = loop_node(&data(json!({ "iterations": 5, "infinite": true }))).unwrap();
    assert_eq!(out.output["iterations"], "infinite");
  }

  #[test]
  fn test_chain_switch_requires_target() {
    assert!(matches!(
      chain_switch(&data(json!({}))),
      Err(NodeError::InvalidParams(_))
    ));
    let out = chain_switch(&data(json!({ "targetChain": "arbitrum" }))).unwrap();
    assert_eq!(out.output["targetChain"], "arbitrum");
  }

  #[test]
  fn test_wallet_connect_uses_run_wallet() {
    let env = env();
    let out = wallet_connect(&data(json!({})), &env).unwrap();
    assert_eq!(out.output["walletType"], "phantom");
    assert_eq!(out.output["address"], env.wallet.address.as_str());
  }

  #[test]
  fn test_multi_wallet_queues_connected_wallets() {
    let mut env = env();
    let wallets = ["0x1111111111", "0x2222222222", "0x3333333333", "0x4444444444"]
      .iter()
      .map(|a| ConnectedWallet {
        address: a.to_string(),
        wallet_type: WalletType::Metamask,
        label: None,
      })
      .collect();
    env.wallet = Arc::new(WalletInfo::new("0x1111111111", WalletType::Metamask).with_wallets(wallets));

    let out = multi_wallet(&data(json!({ "executeSequentially": false })), &env).unwrap();
    assert_eq!(out.output["walletCount"], 4);
    assert_eq!(out.output["mode"], "parallel");
    assert_eq!(out.output["queued"].as_array().unwrap().len(), 4);
    assert_eq!(out.output["queued"][3]["address"], "0x4444444444");
    assert_eq!(out.output["wallets"], json!(["0x1111...", "0x2222...", "0x3333..."]));
  }

  #[test]
  fn test_multi_wallet_sequential_only_when_requested() {
    let env = env();
    let out = multi_wallet(&data(json!({ "executeSequentially": "true" })), &env).unwrap();
    assert_eq!(out.output["mode"], "sequential");

    let out = multi_wallet(&data(json!({ "executeSequentially": "" })), &env).unwrap();
    assert_eq!(out.output["mode"], "parallel");
  }

  #[test]
  fn test_multi_wallet_falls_back_to_primary() {
    let env = env();
    let out = multi_wallet(&data(json!({})), &env).unwrap();
    assert_eq!(out.output["walletCount"], 1);
    assert_eq!(out.output["mode"], "parallel");
    assert_eq!(out.output["queued"][0]["address"], env.wallet.address.as_str());
    assert_eq!(out.output["queued"][0]["walletType"], "phantom");
    assert_eq!(out.output["queued"][0]["status"], "queued");
  }
}
