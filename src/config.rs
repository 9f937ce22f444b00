use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use wraith_engine::EngineConfig;
use wraith_host::{Capabilities, GasPrice};

pub const CONFIG_FILE: &str = "config.toml";

/// Contents of `<data_dir>/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WraithConfig {
  pub engine: EngineSection,
  pub simulation: SimulationSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
  pub history_capacity: usize,
  pub max_wait_ms: Option<u64>,
  pub node_timeout_ms: Option<u64>,
}

impl Default for EngineSection {
  fn default() -> Self {
    Self {
      history_capacity: EngineConfig::default().history_capacity,
      max_wait_ms: None,
      node_timeout_ms: None,
    }
  }
}

/// Tables backing the simulated price, gas, swap and social collaborators.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
  /// USD price per token symbol.
  pub prices: HashMap<String, f64>,
  /// Gas tiers per chain.
  pub gas: HashMap<String, GasPrice>,
}

impl Default for SimulationSection {
  fn default() -> Self {
    let prices = [
      ("SOL", 150.0),
      ("ETH", 3000.0),
      ("BTC", 60000.0),
      ("USDC", 1.0),
      ("USDT", 1.0),
      ("BONK", 0.00002),
      ("JUP", 0.8),
      ("RAY", 2.0),
    ];
    let gas = [
      ("ethereum", 30.0, 45.0),
      ("arbitrum", 0.1, 0.2),
      ("base", 0.05, 0.1),
      ("solana", 0.000005, 0.00001),
    ];
    Self {
      prices: prices
        .into_iter()
        .map(|(symbol, price)| (symbol.to_string(), price))
        .collect(),
      gas: gas
        .into_iter()
        .map(|(chain, standard, fast)| (chain.to_string(), GasPrice { standard, fast }))
        .collect(),
    }
  }
}

impl WraithConfig {
  /// Load the config from `data_dir`. A missing file yields the defaults.
  pub fn load(data_dir: &Path) -> Result<Self> {
    let path = data_dir.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
      Err(e) => {
        return Err(e).with_context(|| format!("failed to read config file: {}", path.display()));
      }
    };
    toml::from_str(&content)
      .with_context(|| format!("failed to parse config file: {}", path.display()))
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      history_capacity: self.engine.history_capacity,
      max_wait: self.engine.max_wait_ms.map(Duration::from_millis),
      node_timeout: self.engine.node_timeout_ms.map(Duration::from_millis),
    }
  }

  pub fn capabilities(&self) -> Capabilities {
    Capabilities::simulated(self.simulation.prices.clone(), self.simulation.gas.clone())
  }
}
