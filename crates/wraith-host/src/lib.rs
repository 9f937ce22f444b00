//! Wraith Host
//!
//! Capabilities the engine injects into node executors. Each collaborator
//! category is a narrow async trait so that real providers (price APIs, gas
//! trackers, DEX aggregators, social platforms) can be plugged in without the
//! engine knowing about them.
//!
//! The crate also ships simulated implementations backed by static tables.
//! They never perform side effects and are what the CLI wires up by default.

mod capabilities;
mod error;
mod gas;
mod price;
mod social;
mod swap;
pub mod token;

pub use capabilities::Capabilities;
pub use error::HostError;
pub use gas::{GasOracle, GasPrice, StaticGasOracle};
pub use price::{PriceOracle, StaticPriceOracle};
pub use social::{SimulatedSocialConnector, SocialConnector, SocialOutcome, SocialPlatform, SocialTask};
pub use swap::{SimulatedSwapRouter, SwapQuote, SwapReceipt, SwapRequest, SwapRouter};
