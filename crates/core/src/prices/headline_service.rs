use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, warn};

use satoshi_market_data::QuotedPriceResolver;

use super::prices_model::PriceStatus;
use super::prices_traits::HeadlinePriceServiceTrait;
use crate::cache::LastKnownPriceCache;
use crate::context::PriceContext;
use crate::errors::Result;

/// Headline price: resolver first, last known value as fallback.
pub struct HeadlinePriceService {
    resolver: Arc<QuotedPriceResolver>,
    cache: LastKnownPriceCache,
    context: PriceContext,
}

impl HeadlinePriceService {
    pub fn new(
        resolver: Arc<QuotedPriceResolver>,
        cache: LastKnownPriceCache,
        context: PriceContext,
    ) -> Self {
        Self {
            resolver,
            cache,
            context,
        }
    }

    fn currency(&self) -> &str {
        self.context.headline_currency()
    }

    fn fallback_status(&self) -> PriceStatus {
        let currency = self.currency().to_string();

        match self.cache.get(&currency) {
            Ok(Some(cached)) => {
                return PriceStatus::LastKnown {
                    currency,
                    value: cached.value,
                    captured_at: cached.captured_at,
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read last known price: {}", e),
        }

        match self.context.headline_rate() {
            Some(value) => PriceStatus::LastKnown {
                currency,
                value,
                captured_at: None,
            },
            None => PriceStatus::Unavailable { currency },
        }
    }
}

#[async_trait]
impl HeadlinePriceServiceTrait for HeadlinePriceService {
    fn cached(&self) -> Result<Option<PriceStatus>> {
        let currency = self.currency();
        let Some(cached) = self.cache.get(currency)? else {
            return Ok(None);
        };

        if self.context.rate(currency).is_none() {
            self.context.set_rate(currency, cached.value);
        }
        Ok(Some(PriceStatus::LastKnown {
            currency: currency.to_string(),
            value: cached.value,
            captured_at: cached.captured_at,
        }))
    }

    async fn refresh(&self) -> PriceStatus {
        match self.resolver.resolve(self.currency()).await {
            Ok(quote) => {
                self.context.set_rate(quote.currency(), quote.value());
                if let Err(e) = self.cache.put(quote.currency(), quote.value()) {
                    warn!("Failed to persist headline price: {}", e);
                }
                debug!("Headline price {} from {}", quote.value(), quote.source());
                PriceStatus::Live { quote }
            }
            Err(e) => {
                error!("Headline price refresh failed: {}", e);
                self.fallback_status()
            }
        }
    }
}
