use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Gas price tiers for a chain, in gwei (or the chain's native fee unit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
  pub standard: f64,
  pub fast: f64,
}

/// Source of current gas prices.
#[async_trait]
pub trait GasOracle: Send + Sync {
  async fn get_gas_price(&self, chain: &str) -> Result<GasPrice, HostError>;
}

/// A gas oracle serving a fixed table. Chain names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct StaticGasOracle {
  prices: HashMap<String, GasPrice>,
}

impl StaticGasOracle {
  pub fn new<I, S>(prices: I) -> Self
  where
    I: IntoIterator<Item = (S, GasPrice)>,
    S: AsRef<str>,
  {
    Self {
      prices: prices
        .into_iter()
        .map(|(chain, price)| (chain.as_ref().to_lowercase(), price))
        .collect(),
    }
  }
}

#[async_trait]
impl GasOracle for StaticGasOracle {
  async fn get_gas_price(&self, chain: &str) -> Result<GasPrice, HostError> {
    self
      .prices
      .get(&chain.to_lowercase())
      .copied()
      .ok_or_else(|| HostError::NotFound(format!("no gas price for chain '{}'", chain)))
  }
}
