use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input::NodeData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: NodeType,
  #[serde(default)]
  pub data: NodeData,
}

impl NodeDef {
  pub fn new(id: impl Into<String>, node_type: NodeType, data: NodeData) -> Self {
    Self {
      id: id.into(),
      node_type,
      data,
    }
  }

  /// The user-facing label: `data.label` if set, otherwise the type's display name.
  pub fn label(&self) -> String {
    self
      .data
      .get("label")
      .and_then(|v| v.as_str())
      .filter(|s| !s.is_empty())
      .map(str::to_string)
      .unwrap_or_else(|| self.node_type.display_name().to_string())
  }
}

/// The kind of action a node performs.
///
/// Serialized as the canvas type name (`"priceCheck"`, `"waitDelay"`, ...).
/// Names that are not recognized are kept as [`NodeType::Unknown`] so a flow
/// containing them still loads; the engine fails such nodes at run time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
  Trigger,
  MultiWallet,
  Swap,
  Bridge,
  ChainSwitch,
  Alert,
  Condition,
  WalletConnect,
  LendStake,
  Twitter,
  Discord,
  Galxe,
  VolumeFarmer,
  ClaimAirdrop,
  WaitDelay,
  Loop,
  PriceCheck,
  GasOptimizer,
  Unknown(String),
}

impl NodeType {
  /// The wire name used by the canvas.
  pub fn as_str(&self) -> &str {
    match self {
      NodeType::Trigger => "trigger",
      NodeType::MultiWallet => "multiWallet",
      NodeType::Swap => "swap",
      NodeType::Bridge => "bridge",
      NodeType::ChainSwitch => "chainSwitch",
      NodeType::Alert => "alert",
      NodeType::Condition => "condition",
      NodeType::WalletConnect => "walletConnect",
      NodeType::LendStake => "lendStake",
      NodeType::Twitter => "twitter",
      NodeType::Discord => "discord",
      NodeType::Galxe => "galxe",
      NodeType::VolumeFarmer => "volumeFarmer",
      NodeType::ClaimAirdrop => "claimAirdrop",
      NodeType::WaitDelay => "waitDelay",
      NodeType::Loop => "loop",
      NodeType::PriceCheck => "priceCheck",
      NodeType::GasOptimizer => "gasOptimizer",
      NodeType::Unknown(name) => name,
    }
  }

  pub fn display_name(&self) -> &str {
    match self {
      NodeType::Trigger => "Trigger",
      NodeType::MultiWallet => "Multi-Wallet",
      NodeType::Swap => "Swap",
      NodeType::Bridge => "Bridge",
      NodeType::ChainSwitch => "Chain Switch",
      NodeType::Alert => "Alert",
      NodeType::Condition => "Condition",
      NodeType::WalletConnect => "Wallet",
      NodeType::LendStake => "Lend/Stake",
      NodeType::Twitter => "Twitter",
      NodeType::Discord => "Discord",
      NodeType::Galxe => "Galxe",
      NodeType::VolumeFarmer => "Volume Farmer",
      NodeType::ClaimAirdrop => "Claim Airdrop",
      NodeType::WaitDelay => "Wait/Delay",
      NodeType::Loop => "Loop",
      NodeType::PriceCheck => "Price Check",
      NodeType::GasOptimizer => "Gas Optimizer",
      NodeType::Unknown(_) => "Node",
    }
  }
}

impl From<String> for NodeType {
  fn from(name: String) -> Self {
    match name.as_str() {
      "trigger" => NodeType::Trigger,
      "multiWallet" => NodeType::MultiWallet,
      "swap" => NodeType::Swap,
      "bridge" => NodeType::Bridge,
      "chainSwitch" => NodeType::ChainSwitch,
      "alert" => NodeType::Alert,
      "condition" => NodeType::Condition,
      "walletConnect" => NodeType::WalletConnect,
      "lendStake" => NodeType::LendStake,
      "twitter" => NodeType::Twitter,
      "discord" => NodeType::Discord,
      "galxe" => NodeType::Galxe,
      "volumeFarmer" => NodeType::VolumeFarmer,
      "claimAirdrop" => NodeType::ClaimAirdrop,
      "waitDelay" => NodeType::WaitDelay,
      "loop" => NodeType::Loop,
      "priceCheck" => NodeType::PriceCheck,
      "gasOptimizer" => NodeType::GasOptimizer,
      _ => NodeType::Unknown(name),
    }
  }
}

impl From<NodeType> for String {
  fn from(node_type: NodeType) -> Self {
    match node_type {
      NodeType::Unknown(name) => name,
      other => other.as_str().to_string(),
    }
  }
}

impl fmt::Display for NodeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
