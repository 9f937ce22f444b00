//! Node executors.
//!
//! [`execute`] renders a node's parameters and dispatches on its type. Every
//! executor returns the JSON output recorded for the node, and whether the
//! run may continue past it (only Condition nodes can say no).

mod control;
mod defi;
mod market;
mod params;
mod social;
mod wait;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use wraith_config::{NodeType, WalletInfo};
use wraith_flow::Node;
use wraith_host::{Capabilities, SocialPlatform};

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::input::render_params;

pub use market::Operator;

/// What a node produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutcome {
  pub output: Value,
  /// `false` stops every node after this one.
  pub condition_passed: bool,
}

impl NodeOutcome {
  pub fn success(output: Value) -> Self {
    Self {
      output,
      condition_passed: true,
    }
  }

  pub fn halted(output: Value) -> Self {
    Self {
      output,
      condition_passed: false,
    }
  }
}

/// Everything an executor may use besides its own parameters.
#[derive(Debug, Clone)]
pub struct NodeEnv {
  pub run_id: String,
  pub wallet: Arc<WalletInfo>,
  pub capabilities: Capabilities,
  pub max_wait: Option<Duration>,
}

/// Execute one node against the outputs recorded so far.
pub async fn execute(
  node: &Node,
  context: &ExecutionContext,
  env: &NodeEnv,
) -> Result<NodeOutcome, NodeError> {
  if let NodeType::Unknown(name) = &node.node_type {
    return Err(NodeError::UnsupportedNodeType(name.clone()));
  }

  let data = render_params(&node.data, context, &env.wallet)?;
  let id = node.node_id.as_str();

  match &node.node_type {
    NodeType::Trigger => control::trigger(&data),
    NodeType::Loop => control::loop_node(&data),
    NodeType::ChainSwitch => control::chain_switch(&data),
    NodeType::WalletConnect => control::wallet_connect(&data, env),
    NodeType::MultiWallet => control::multi_wallet(&data, env),
    NodeType::WaitDelay => wait::wait_delay(&data, env).await,
    NodeType::PriceCheck => market::price_check(&data, env).await,
    NodeType::GasOptimizer => market::gas_optimizer(&data, env).await,
    NodeType::Condition => market::condition(&data, context, env).await,
    NodeType::Swap => defi::swap(id, &data, context, env).await,
    NodeType::Bridge => defi::bridge(id, &data, context),
    NodeType::LendStake => defi::lend_stake(id, &data, context),
    NodeType::VolumeFarmer => defi::volume_farmer(&data),
    NodeType::ClaimAirdrop => defi::claim_airdrop(id, &data, env),
    NodeType::Alert => social::alert(&data, env),
    NodeType::Twitter => social::social_task(SocialPlatform::Twitter, &data, env).await,
    NodeType::Discord => social::social_task(SocialPlatform::Discord, &data, env).await,
    NodeType::Galxe => social::social_task(SocialPlatform::Galxe, &data, env).await,
    NodeType::Unknown(name) => Err(NodeError::UnsupportedNodeType(name.clone())),
  }
}

/// USD value of `amount` units of `token`, priced from the most recent upstream output.
fn amount_usd(context: &ExecutionContext, token: &str, amount: f64) -> Option<f64> {
  context
    .latest_number("price", Some(token))
    .map(|(_, price)| amount * price)
}
