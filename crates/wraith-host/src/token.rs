//! Token symbol helpers for Solana swaps.

const MINTS: &[(&str, &str)] = &[
  ("SOL", "So11111111111111111111111111111111111111112"),
  ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
  ("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
  ("BONK", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
  ("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
  ("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R"),
];

/// Resolve a symbol to its mint address. Unknown symbols are assumed to
/// already be mint addresses and are returned unchanged.
pub fn mint_address(symbol: &str) -> String {
  let upper = symbol.to_uppercase();
  MINTS
    .iter()
    .find(|(s, _)| *s == upper)
    .map(|(_, mint)| mint.to_string())
    .unwrap_or_else(|| symbol.to_string())
}

/// Decimals used to convert a UI amount to base units.
pub fn decimals(symbol: &str) -> u32 {
  match symbol.to_uppercase().as_str() {
    "USDC" | "USDT" => 6,
    _ => 9,
  }
}

/// Convert a UI amount (e.g. `0.5` SOL) to base units (lamports), rounding down.
pub fn to_base_units(amount: f64, symbol: &str) -> u64 {
  if !amount.is_finite() || amount <= 0.0 {
    return 0;
  }
  (amount * 10f64.powi(decimals(symbol) as i32)).floor() as u64
}

/// Shorten an address for display: `7xKXtg...`.
pub fn truncate_address(address: &str) -> String {
  match address.char_indices().nth(6) {
    Some((idx, _)) => format!("{}...", &address[..idx]),
    None => address.to_string(),
  }
}
