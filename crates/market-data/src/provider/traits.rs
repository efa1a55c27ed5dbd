//! Price provider trait definitions.
//!
//! This module defines the `PriceProvider` capability that every upstream
//! price source implements, and the `BlockHeightProvider` used for chain data.

use async_trait::async_trait;

use crate::errors::PriceError;
use crate::models::{BlockHeight, Currency, HistoricalPrice, PriceQuote, RateSnapshot};

use super::capabilities::ProviderCapabilities;

/// Trait for Bitcoin price providers.
///
/// Implement this trait to add a new upstream price source. Providers differ
/// only in endpoint and response-shape parsing; the resolver treats them as
/// interchangeable and orders them by [`priority`](Self::priority).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use satoshi_market_data::provider::{CurrencyCoverage, PriceProvider, ProviderCapabilities};
///
/// struct MyExchange;
///
/// #[async_trait]
/// impl PriceProvider for MyExchange {
///     fn id(&self) -> &'static str {
///         "MY_EXCHANGE"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             currencies: CurrencyCoverage::Only(&["usd"]),
///             supports_batch: false,
///             supports_history: false,
///         }
///     }
///
///     // ... implement fetch_rate
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "COINGECKO", "BINANCE", etc.
    /// Used for logging, quote attribution and diagnostics.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    /// Providers with equal priority keep their registration order.
    fn priority(&self) -> u8 {
        10
    }

    /// Describes which currencies and operations this provider serves.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch the current BTC rate in `currency` (lowercase).
    ///
    /// Network failures and non-2xx answers are `Transport` errors; a body
    /// without the expected field is a `Shape` error.
    async fn fetch_rate(&self, currency: &str) -> Result<PriceQuote, PriceError>;

    /// Fetch BTC rates for several currencies in one call.
    ///
    /// Default implementation returns `NotSupported`.
    async fn fetch_rates(&self, currencies: &[Currency]) -> Result<RateSnapshot, PriceError> {
        let _ = currencies;
        Err(PriceError::NotSupported {
            operation: "batch_rates".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Fetch a daily BTC price series covering the last `days` days,
    /// ordered by timestamp ascending.
    ///
    /// Default implementation returns `NotSupported`.
    async fn fetch_daily_history(
        &self,
        currency: &str,
        days: u32,
    ) -> Result<Vec<HistoricalPrice>, PriceError> {
        let _ = (currency, days);
        Err(PriceError::NotSupported {
            operation: "history".to_string(),
            provider: self.id().to_string(),
        })
    }
}

/// Trait for chain-tip height sources.
#[async_trait]
pub trait BlockHeightProvider: Send + Sync {
    /// Unique identifier for this source.
    fn id(&self) -> &'static str;

    /// Fetch the current chain tip height.
    async fn fetch_height(&self) -> Result<BlockHeight, PriceError>;
}
