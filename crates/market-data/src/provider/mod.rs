//! Price provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait that all price sources implement
//! - The `BlockHeightProvider` trait for chain-tip sources
//! - Provider capabilities (currency coverage, batch, history)
//! - Concrete providers (CoinGecko, Binance, Kraken, Blockchain.info, Blockstream)
//!
//! Providers only fetch and validate. Retries, timeouts and fallback across
//! providers live in the resolver module.

mod capabilities;
mod http;
mod traits;

pub mod binance;
pub mod blockchain_info;
pub mod blockstream;
pub mod coingecko;
pub mod kraken;

// Re-exports
pub use capabilities::{CurrencyCoverage, ProviderCapabilities};
pub use traits::{BlockHeightProvider, PriceProvider};
