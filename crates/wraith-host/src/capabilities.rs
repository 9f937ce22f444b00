use std::collections::HashMap;
use std::sync::Arc;

use crate::gas::{GasOracle, GasPrice, StaticGasOracle};
use crate::price::{PriceOracle, StaticPriceOracle};
use crate::social::{SimulatedSocialConnector, SocialConnector};
use crate::swap::{SimulatedSwapRouter, SwapRouter};

/// The collaborators available to node executors during a run.
///
/// Every category is optional. Executors that need a missing price or gas
/// source fail; executors that can fall back to a placeholder result (swaps,
/// social tasks) do so when their collaborator is absent.
#[derive(Clone, Default)]
pub struct Capabilities {
  pub prices: Option<Arc<dyn PriceOracle>>,
  pub gas: Option<Arc<dyn GasOracle>>,
  pub social: Option<Arc<dyn SocialConnector>>,
  pub router: Option<Arc<dyn SwapRouter>>,
}

impl Capabilities {
  pub fn new() -> Self {
    Self::default()
  }

  /// Simulated collaborators backed by static price and gas tables.
  pub fn simulated(prices: HashMap<String, f64>, gas: HashMap<String, GasPrice>) -> Self {
    let prices: Arc<dyn PriceOracle> = Arc::new(StaticPriceOracle::new(prices));
    Self {
      router: Some(Arc::new(SimulatedSwapRouter::new(prices.clone()))),
      prices: Some(prices),
      gas: Some(Arc::new(StaticGasOracle::new(gas))),
      social: Some(Arc::new(SimulatedSocialConnector)),
    }
  }

  pub fn with_prices(mut self, prices: Arc<dyn PriceOracle>) -> Self {
    self.prices = Some(prices);
    self
  }

  pub fn with_gas(mut self, gas: Arc<dyn GasOracle>) -> Self {
    self.gas = Some(gas);
    self
  }

  pub fn with_social(mut self, social: Arc<dyn SocialConnector>) -> Self {
    self.social = Some(social);
    self
  }

  pub fn with_router(mut self, router: Arc<dyn SwapRouter>) -> Self {
    self.router = Some(router);
    self
  }
}

impl std::fmt::Debug for Capabilities {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Capabilities")
      .field("prices", &self.prices.is_some())
      .field("gas", &self.gas.is_some())
      .field("social", &self.social.is_some())
      .field("router", &self.router.is_some())
      .finish()
  }
}
