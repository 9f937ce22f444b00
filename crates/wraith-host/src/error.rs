use thiserror::Error;

/// Errors returned by host capabilities.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
  /// The requested symbol, chain or resource is unknown to the provider.
  #[error("not found: {0}")]
  NotFound(String),

  /// The provider could not be reached or refused to serve the request.
  #[error("provider unavailable: {0}")]
  Unavailable(String),

  /// The request was understood but rejected (bad amount, unsupported pair, ...).
  #[error("request rejected: {0}")]
  Rejected(String),
}
