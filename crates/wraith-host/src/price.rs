use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::HostError;

/// Source of USD spot prices.
#[async_trait]
pub trait PriceOracle: Send + Sync {
  /// Get the USD price of `symbol`, or `None` if the oracle does not list it.
  async fn get_price(&self, symbol: &str) -> Result<Option<f64>, HostError>;
}

/// A price oracle serving a fixed table. Symbols are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
  prices: HashMap<String, f64>,
}

impl StaticPriceOracle {
  pub fn new<I, S>(prices: I) -> Self
  where
    I: IntoIterator<Item = (S, f64)>,
    S: AsRef<str>,
  {
    Self {
      prices: prices
        .into_iter()
        .map(|(symbol, price)| (symbol.as_ref().to_uppercase(), price))
        .collect(),
    }
  }

  pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
    self.prices.insert(symbol.to_uppercase(), price);
    self
  }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
  async fn get_price(&self, symbol: &str) -> Result<Option<f64>, HostError> {
    Ok(self.prices.get(&symbol.to_uppercase()).copied())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_lookup_is_case_insensitive() {
    let oracle = StaticPriceOracle::new([("eth", 1200.0)]).with_price("Sol", 150.0);

    assert_eq!(oracle.get_price("ETH").await.unwrap(), Some(1200.0));
    assert_eq!(oracle.get_price("sol").await.unwrap(), Some(150.0));
    assert_eq!(oracle.get_price("DOGE").await.unwrap(), None);
  }
}
