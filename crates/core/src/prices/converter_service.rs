use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use satoshi_market_data::{normalize_currency, Currency, QuotedPriceResolver};

use super::prices_model::{ConverterPrice, RateFreshness};
use super::prices_traits::ConverterPriceServiceTrait;
use crate::cache::{CacheEntry, RatesCache};
use crate::context::PriceContext;
use crate::errors::{Error, Result};

struct Inner {
    resolver: Arc<QuotedPriceResolver>,
    cache: RatesCache,
    context: PriceContext,
    currencies: Vec<Currency>,
    refreshing: AtomicBool,
}

impl Inner {
    async fn refresh_all(&self) -> Result<CacheEntry> {
        let snapshot = self.resolver.resolve_rates(&self.currencies).await?;
        let entry = self.cache.put(&snapshot.rates)?;
        self.context.set_rates(&entry.rates);
        debug!(
            "Refreshed {} converter rates from {}",
            entry.rates.len(),
            snapshot.source
        );
        Ok(entry)
    }
}

/// Multi-currency BTC rates for the converter and tools.
///
/// A fresh cache hit is returned immediately and also kicks off a background
/// refresh so the next read finds warm data. At most one background refresh
/// runs at a time.
#[derive(Clone)]
pub struct ConverterPriceService {
    inner: Arc<Inner>,
}

impl ConverterPriceService {
    pub fn new(
        resolver: Arc<QuotedPriceResolver>,
        cache: RatesCache,
        context: PriceContext,
        currencies: Vec<Currency>,
    ) -> Self {
        let mut seen = HashSet::new();
        let currencies: Vec<Currency> = currencies
            .iter()
            .map(|c| normalize_currency(c))
            .filter(|c| seen.insert(c.clone()))
            .collect();

        Self {
            inner: Arc::new(Inner {
                resolver,
                cache,
                context,
                currencies,
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.inner.currencies
    }

    fn spawn_background_refresh(&self) {
        if self.inner.refreshing.swap(true, Ordering::AcqRel) {
            debug!("Background rate refresh already running");
            return;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Err(e) = inner.refresh_all().await {
                debug!("Background rate refresh failed: {}", e);
            }
            inner.refreshing.store(false, Ordering::Release);
        });
    }
}

#[async_trait]
impl ConverterPriceServiceTrait for ConverterPriceService {
    async fn btc_price_for(&self, currency: &str) -> Result<ConverterPrice> {
        let currency = normalize_currency(currency).into_owned();
        let inner = &self.inner;

        match inner.cache.get(&currency) {
            Ok(Some(rate)) => {
                inner.context.set_rate(&currency, rate);
                self.spawn_background_refresh();
                return Ok(ConverterPrice {
                    currency,
                    rate,
                    freshness: RateFreshness::Cached,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Rates cache read failed: {}", e),
        }

        match inner.refresh_all().await {
            Ok(entry) => {
                if let Some(rate) = entry.rate(&currency) {
                    return Ok(ConverterPrice {
                        currency,
                        rate,
                        freshness: RateFreshness::Live,
                    });
                }
            }
            Err(e) => warn!("Rate refresh for '{}' failed: {}", currency, e),
        }

        match inner.cache.get_stale_if_present(&currency) {
            Ok(Some(rate)) => {
                inner.context.set_rate(&currency, rate);
                Ok(ConverterPrice {
                    currency,
                    rate,
                    freshness: RateFreshness::LastKnown,
                })
            }
            Ok(None) => Err(Error::PriceUnavailable(currency)),
            Err(e) => {
                warn!("Rates cache read failed: {}", e);
                Err(Error::PriceUnavailable(currency))
            }
        }
    }

    async fn refresh_all(&self) -> Result<CacheEntry> {
        self.inner.refresh_all().await
    }
}
