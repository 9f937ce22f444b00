use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use wraith_config::NodeData;
use wraith_host::SwapRequest;

use super::params::{self, Amount, opt_amount, opt_f64, opt_string, opt_u64};
use super::{NodeEnv, NodeOutcome, amount_usd};
use crate::context::ExecutionContext;
use crate::error::NodeError;

fn positive(name: &str, amount: f64) -> Result<f64, NodeError> {
  if amount.is_finite() && amount > 0.0 {
    Ok(amount)
  } else {
    Err(NodeError::InvalidParams(format!(
      "{} must be positive, got {}",
      name, amount
    )))
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapParams {
  #[serde(default, deserialize_with = "opt_string")]
  from_token: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  to_token: Option<String>,
  #[serde(default, deserialize_with = "opt_f64")]
  amount: Option<f64>,
  /// Percent, e.g. `0.5` for 50 bps.
  #[serde(default, deserialize_with = "opt_f64")]
  slippage: Option<f64>,
  #[serde(default, deserialize_with = "opt_string")]
  dex: Option<String>,
}

/// Quote and simulate a swap through the router, or record a placeholder
/// result when no router is configured.
pub(super) async fn swap(
  node_id: &str,
  data: &NodeData,
  context: &ExecutionContext,
  env: &NodeEnv,
) -> Result<NodeOutcome, NodeError> {
  let p: SwapParams = params::parse(data)?;
  let from = p.from_token.unwrap_or_else(|| "SOL".to_string()).to_uppercase();
  let to = p.to_token.unwrap_or_else(|| "USDC".to_string()).to_uppercase();
  let amount = positive("amount", p.amount.unwrap_or(0.01))?;
  let slippage = p.slippage.unwrap_or(1.0);
  let dex = p.dex.unwrap_or_else(|| "jupiter".to_string());
  if from == to {
    return Err(NodeError::InvalidParams(format!(
      "cannot swap {} to itself",
      from
    )));
  }

  let usd = amount_usd(context, &from, amount);

  let Some(router) = env.capabilities.router.as_ref() else {
    debug!(run_id = %env.run_id, node_id, "no swap router configured, recording placeholder");
    return Ok(NodeOutcome::success(json!({
      "fromToken": from,
      "toToken": to,
      "amount": amount,
      "amountUsd": usd,
      "slippage": slippage,
      "dex": dex,
      "walletAddress": env.wallet.address,
      "signature": format!("SIMULATED_SWAP_{}", node_id),
      "executed": false,
      "simulated": true,
    })));
  };

  let request = SwapRequest::new(&from, &to, amount, slippage, &dex);
  let quote = router.quote(&request).await?;
  let receipt = router
    .build_and_maybe_execute(&quote, &env.wallet.address, true)
    .await?;

  Ok(NodeOutcome::success(json!({
    "fromToken": from,
    "toToken": to,
    "amount": amount,
    "amountUsd": usd,
    "inputMint": request.input_mint,
    "outputMint": request.output_mint,
    "amountBaseUnits": request.amount_base_units,
    "slippageBps": request.slippage_bps,
    "dex": dex,
    "expectedOut": quote.out_amount,
    "minimumOut": quote.min_out_amount,
    "amountOut": receipt.amount_out,
    "walletAddress": env.wallet.address,
    "signature": receipt.signature,
    "executed": receipt.executed,
    "simulated": !receipt.executed,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeParams {
  #[serde(default, deserialize_with = "opt_string")]
  from_chain: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  to_chain: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  bridge_protocol: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  token: Option<String>,
  #[serde(default, deserialize_with = "opt_f64")]
  amount: Option<f64>,
}

pub(super) fn bridge(
  node_id: &str,
  data: &NodeData,
  context: &ExecutionContext,
) -> Result<NodeOutcome, NodeError> {
  let p: BridgeParams = params::parse(data)?;
  let from_chain = p
    .from_chain
    .ok_or_else(|| NodeError::InvalidParams("fromChain is required".to_string()))?;
  let to_chain = p
    .to_chain
    .ok_or_else(|| NodeError::InvalidParams("toChain is required".to_string()))?;
  if from_chain.eq_ignore_ascii_case(&to_chain) {
    return Err(NodeError::InvalidParams(format!(
      "bridge source and destination are both {}",
      from_chain
    )));
  }
  let token = p.token.unwrap_or_else(|| "USDC".to_string()).to_uppercase();
  let amount = positive("amount", p.amount.unwrap_or(0.0))?;

  Ok(NodeOutcome::success(json!({
    "fromChain": from_chain,
    "toChain": to_chain,
    "protocol": p.bridge_protocol.unwrap_or_else(|| "stargate".to_string()),
    "token": token,
    "amount": amount,
    "amountUsd": amount_usd(context, &token, amount),
    "signature": format!("SIMULATED_BRIDGE_{}", node_id),
    "simulated": true,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LendStakeParams {
  #[serde(default, alias = "action", deserialize_with = "opt_string")]
  action_type: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  protocol: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  token: Option<String>,
  #[serde(default, deserialize_with = "opt_amount")]
  amount: Option<Amount>,
}

const LEND_STAKE_ACTIONS: [&str; 4] = ["lend", "stake", "unstake", "withdraw"];

/// Record a lending or staking position change.
///
/// Actions outside the built-in set (`deposit`, `compound`, ...) are kept
/// as given. Symbolic amounts such as `"all"` or `"rewards"` carry no USD
/// estimate.
pub(super) fn lend_stake(
  node_id: &str,
  data: &NodeData,
  context: &ExecutionContext,
) -> Result<NodeOutcome, NodeError> {
  let p: LendStakeParams = params::parse(data)?;
  let action = p.action_type.unwrap_or_else(|| "stake".to_string()).to_lowercase();
  if !LEND_STAKE_ACTIONS.contains(&action.as_str()) {
    debug!(node_id, action = %action, "passing through custom lend/stake action");
  }
  let token = p.token.unwrap_or_else(|| "SOL".to_string()).to_uppercase();

  let (amount, usd) = match p.amount {
    Some(Amount::Units(units)) => {
      let units = positive("amount", units)?;
      (json!(units), amount_usd(context, &token, units))
    }
    Some(Amount::Symbolic(symbol)) => (json!(symbol), None),
    None => return Err(NodeError::InvalidParams("amount is required".to_string())),
  };

  Ok(NodeOutcome::success(json!({
    "action": action,
    "protocol": p.protocol,
    "token": token,
    "amount": amount,
    "amountUsd": usd,
    "signature": format!("SIMULATED_{}_{}", signature_tag(&action), node_id),
    "simulated": true,
  })))
}

/// Upper-case an action for use in a signature, mapping separators to `_`.
fn signature_tag(action: &str) -> String {
  action
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
    .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeParams {
  #[serde(default, deserialize_with = "opt_u64")]
  swap_count: Option<u64>,
  #[serde(default, deserialize_with = "opt_f64")]
  swap_amount: Option<f64>,
  #[serde(default, deserialize_with = "opt_f64")]
  target_volume: Option<f64>,
  #[serde(default, deserialize_with = "opt_string")]
  token: Option<String>,
}

/// Plan a batch of round-trip swaps. Nothing is submitted.
pub(super) fn volume_farmer(data: &NodeData) -> Result<NodeOutcome, NodeError> {
  let p: VolumeParams = params::parse(data)?;
  let swap_count = p.swap_count.unwrap_or(10);
  let swap_amount = positive("swapAmount", p.swap_amount.unwrap_or(0.01))?;
  let projected = swap_count as f64 * swap_amount;

  Ok(NodeOutcome::success(json!({
    "token": p.token.map(|t| t.to_uppercase()).unwrap_or_else(|| "SOL".to_string()),
    "swapCount": swap_count,
    "swapAmount": swap_amount,
    "targetVolume": p.target_volume,
    "projectedVolume": projected,
    "targetReached": p.target_volume.map(|t| projected >= t),
    "status": "planned",
    "simulated": true,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimParams {
  #[serde(default, deserialize_with = "opt_string")]
  project_name: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  contract_address: Option<String>,
}

pub(super) fn claim_airdrop(
  node_id: &str,
  data: &NodeData,
  env: &NodeEnv,
) -> Result<NodeOutcome, NodeError> {
  let p: ClaimParams = params::parse(data)?;
  let project = p
    .project_name
    .ok_or_else(|| NodeError::InvalidParams("projectName is required".to_string()))?;

  Ok(NodeOutcome::success(json!({
    "projectName": project,
    "contractAddress": p.contract_address,
    "walletAddress": env.wallet.address,
    "claimed": true,
    "signature": format!("SIMULATED_CLAIM_{}", node_id),
    "simulated": true,
  })))
}
