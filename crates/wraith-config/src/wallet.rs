use serde::{Deserialize, Serialize};

/// The wallet extension a user connected with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
  Phantom,
  #[default]
  Metamask,
  Rabby,
  Coinbase,
}

/// A wallet connected alongside the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedWallet {
  pub address: String,
  #[serde(rename = "type")]
  pub wallet_type: WalletType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

/// The wallet identity a run executes on behalf of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
  pub address: String,
  #[serde(default)]
  pub wallet_type: WalletType,
  /// Every connected wallet, including the primary one when the caller lists it.
  #[serde(default)]
  pub all_wallets: Vec<ConnectedWallet>,
}

impl WalletInfo {
  pub fn new(address: impl Into<String>, wallet_type: WalletType) -> Self {
    Self {
      address: address.into(),
      wallet_type,
      all_wallets: Vec::new(),
    }
  }

  pub fn with_wallets(mut self, wallets: Vec<ConnectedWallet>) -> Self {
    self.all_wallets = wallets;
    self
  }

  /// Whether the primary address can identify a run.
  pub fn is_usable(&self) -> bool {
    !self.address.trim().is_empty()
  }

  /// Number of wallets the run covers (at least the primary one).
  pub fn wallet_count(&self) -> usize {
    self.all_wallets.len().max(1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_blank_address_is_not_usable() {
    assert!(!WalletInfo::new("   ", WalletType::Phantom).is_usable());
    assert!(WalletInfo::new("7xKXabc", WalletType::Phantom).is_usable());
  }

  #[test]
  fn test_wallet_count_includes_primary() {
    let wallet = WalletInfo::new("0xabc", WalletType::Metamask);
    assert_eq!(wallet.wallet_count(), 1);

    let wallet = wallet.with_wallets(vec![
      ConnectedWallet {
        address: "0xabc".to_string(),
        wallet_type: WalletType::Metamask,
        label: None,
      },
      ConnectedWallet {
        address: "0xdef".to_string(),
        wallet_type: WalletType::Rabby,
        label: Some("farm".to_string()),
      },
    ]);
    assert_eq!(wallet.wallet_count(), 2);
  }
}
