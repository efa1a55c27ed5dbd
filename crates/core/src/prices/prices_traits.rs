use async_trait::async_trait;

use super::prices_model::{ConverterPrice, PriceStatus};
use crate::cache::CacheEntry;
use crate::errors::Result;

/// Trait defining the contract for the headline price service.
#[async_trait]
pub trait HeadlinePriceServiceTrait: Send + Sync {
    /// Status built from storage alone, for display before the first refresh.
    fn cached(&self) -> Result<Option<PriceStatus>>;

    /// Resolve the headline price. Never fails: degrades to the last known
    /// value or to `Unavailable`.
    async fn refresh(&self) -> PriceStatus;
}

/// Trait defining the contract for the multi-currency converter price service.
#[async_trait]
pub trait ConverterPriceServiceTrait: Send + Sync {
    /// BTC rate in `currency`, preferring a fresh cache entry.
    async fn btc_price_for(&self, currency: &str) -> Result<ConverterPrice>;

    /// Fetch every configured currency and replace the cache entry.
    async fn refresh_all(&self) -> Result<CacheEntry>;
}
