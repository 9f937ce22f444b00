use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HostError;
use crate::price::PriceOracle;
use crate::token;

/// A swap the engine wants priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
  pub from_token: String,
  pub to_token: String,
  pub input_mint: String,
  pub output_mint: String,
  /// Amount in UI units of `from_token`.
  pub amount: f64,
  /// Amount in base units of `from_token`.
  pub amount_base_units: u64,
  pub slippage_bps: u32,
  pub dex: String,
}

impl SwapRequest {
  pub fn new(from_token: &str, to_token: &str, amount: f64, slippage_pct: f64, dex: &str) -> Self {
    Self {
      from_token: from_token.to_string(),
      to_token: to_token.to_string(),
      input_mint: token::mint_address(from_token),
      output_mint: token::mint_address(to_token),
      amount,
      amount_base_units: token::to_base_units(amount, from_token),
      slippage_bps: (slippage_pct * 100.0).floor().max(0.0) as u32,
      dex: dex.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
  pub request: SwapRequest,
  /// Expected output in UI units of `to_token`.
  pub out_amount: f64,
  /// Minimum output after slippage, in UI units.
  pub min_out_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
  pub signature: String,
  pub amount_out: f64,
  /// Whether the transaction was actually submitted.
  pub executed: bool,
}

/// Quotes and (optionally) executes swaps on behalf of a wallet.
#[async_trait]
pub trait SwapRouter: Send + Sync {
  async fn quote(&self, request: &SwapRequest) -> Result<SwapQuote, HostError>;

  /// Build the transaction for `quote` and submit it when `execute` is set.
  async fn build_and_maybe_execute(
    &self,
    quote: &SwapQuote,
    wallet_address: &str,
    execute: bool,
  ) -> Result<SwapReceipt, HostError>;
}

/// A router that prices swaps from a price oracle and never submits anything.
#[derive(Clone)]
pub struct SimulatedSwapRouter {
  prices: Arc<dyn PriceOracle>,
}

impl SimulatedSwapRouter {
  pub fn new(prices: Arc<dyn PriceOracle>) -> Self {
    Self { prices }
  }

  async fn price_of(&self, symbol: &str) -> Result<f64, HostError> {
    self
      .prices
      .get_price(symbol)
      .await?
      .filter(|p| *p > 0.0)
      .ok_or_else(|| HostError::NotFound(format!("no price for '{}'", symbol)))
  }
}

#[async_trait]
impl SwapRouter for SimulatedSwapRouter {
  async fn quote(&self, request: &SwapRequest) -> Result<SwapQuote, HostError> {
    if request.amount_base_units == 0 {
      return Err(HostError::Rejected(format!(
        "swap amount must be positive, got {}",
        request.amount
      )));
    }

    let from_price = self.price_of(&request.from_token).await?;
    let to_price = self.price_of(&request.to_token).await?;
    let out_amount = request.amount * from_price / to_price;
    let min_out_amount = out_amount * (1.0 - request.slippage_bps as f64 / 10_000.0);

    debug!(
      from = %request.from_token,
      to = %request.to_token,
      amount = request.amount,
      out_amount,
      "simulated swap quote"
    );

    Ok(SwapQuote {
      request: request.clone(),
      out_amount,
      min_out_amount,
    })
  }

  async fn build_and_maybe_execute(
    &self,
    quote: &SwapQuote,
    _wallet_address: &str,
    _execute: bool,
  ) -> Result<SwapReceipt, HostError> {
    let request = &quote.request;
    Ok(SwapReceipt {
      signature: format!(
        "SIMULATED_{}_{}_{}_{}",
        request.dex.to_uppercase(),
        request.from_token.to_uppercase(),
        request.to_token.to_uppercase(),
        request.amount_base_units
      ),
      amount_out: quote.out_amount,
      executed: false,
    })
  }
}
