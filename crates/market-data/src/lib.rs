//! Satoshi Market Data Crate
//!
//! Provider-agnostic acquisition of the Bitcoin price and chain-tip height.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Several interchangeable price providers: CoinGecko, Binance, Kraken
//! - Chain height sources: Blockchain.info, Blockstream
//! - Bounded retries per provider with a per-attempt timeout
//! - Sequential or racing fallback across providers
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     Caller       |  (cache layer, refresh driver, CLI)
//! +------------------+
//!          |
//!          v
//! +---------------------+
//! | QuotedPriceResolver |  (retry + fallback)
//! +---------------------+
//!          |
//!          v
//! +------------------+
//! |  PriceProvider   |  (CoinGecko, Binance, Kraken)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   PriceQuote     |  (positive value + source + time)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceQuote`] - A validated BTC rate in one currency
//! - [`RateSnapshot`] - Rates for several currencies from one call
//! - [`BlockHeight`] - Observed chain tip
//! - [`PriceError`] - Transport, shape, and exhaustion failures

pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

// Re-export all public types from models
pub use models::{
    normalize_currency, BlockHeight, Currency, HistoricalPrice, PriceQuote, ProviderId,
    RateSnapshot,
};

pub use errors::{ErrorKind, PriceError, ProviderAttempt};

// Re-export resolver types
pub use resolver::{
    ChainHeightResolver, FallbackStrategy, QuotedPriceResolver, RetryPolicy,
    DEFAULT_ATTEMPTS_PER_PROVIDER, DEFAULT_ATTEMPT_TIMEOUT,
};

// Re-export provider types
pub use provider::binance::BinanceProvider;
pub use provider::blockchain_info::BlockchainInfoProvider;
pub use provider::blockstream::BlockstreamProvider;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::kraken::KrakenProvider;
pub use provider::{BlockHeightProvider, CurrencyCoverage, PriceProvider, ProviderCapabilities};

use std::sync::Arc;

/// The default price providers in priority order.
pub fn default_price_providers() -> Result<Vec<Arc<dyn PriceProvider>>, PriceError> {
    let providers: Vec<Arc<dyn PriceProvider>> = vec![
        Arc::new(CoinGeckoProvider::new()?),
        Arc::new(BinanceProvider::new()?),
        Arc::new(KrakenProvider::new()?),
    ];
    Ok(providers)
}

/// The default chain-height sources in fallback order.
pub fn default_height_providers() -> Result<Vec<Arc<dyn BlockHeightProvider>>, PriceError> {
    let providers: Vec<Arc<dyn BlockHeightProvider>> = vec![
        Arc::new(BlockchainInfoProvider::new()?),
        Arc::new(BlockstreamProvider::new()?),
    ];
    Ok(providers)
}
