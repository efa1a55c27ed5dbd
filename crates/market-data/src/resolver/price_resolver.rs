//! Quoted-price resolver.
//!
//! Resolves the current BTC rate for a currency from an ordered list of
//! providers:
//! 1. Filter providers that can quote the currency
//! 2. Order by priority (stable, lower first)
//! 3. Try each provider up to `attempts_per_provider` times, each attempt
//!    bounded by `attempt_timeout`
//! 4. Return the first success; fail with `AllSourcesUnavailable` otherwise
//!
//! The resolver holds no state between calls: every call restarts from the
//! top of the list. It never consults a cache; callers layer that on top.

use std::sync::Arc;

use futures::FutureExt;
use log::{info, warn};

use super::attempt::{attempt_provider, first_success, ProviderOutcome};
use super::policy::{FallbackStrategy, RetryPolicy};
use crate::errors::PriceError;
use crate::models::{normalize_currency, Currency, HistoricalPrice, PriceQuote, RateSnapshot};
use crate::provider::PriceProvider;

/// Which capability a resolution needs from a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Need {
    Rate,
    Batch,
    History,
}

/// Resolver for the current BTC rate across several upstream providers.
pub struct QuotedPriceResolver {
    providers: Vec<Arc<dyn PriceProvider>>,
    policy: RetryPolicy,
    strategy: FallbackStrategy,
}

impl QuotedPriceResolver {
    /// Create a resolver with the default policy (2 attempts, 4000 ms) and
    /// sequential fallback.
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>) -> Self {
        Self::with_config(providers, RetryPolicy::default(), FallbackStrategy::default())
    }

    /// Create a resolver with custom configuration.
    pub fn with_config(
        providers: Vec<Arc<dyn PriceProvider>>,
        policy: RetryPolicy,
        strategy: FallbackStrategy,
    ) -> Self {
        Self {
            providers,
            policy,
            strategy,
        }
    }

    /// Resolve the BTC rate in `currency`.
    ///
    /// Fails with [`PriceError::AllSourcesUnavailable`] when every eligible
    /// provider exhausts its attempts, or when no provider can quote the
    /// currency at all.
    pub async fn resolve(&self, currency: &str) -> Result<PriceQuote, PriceError> {
        let currency = normalize_currency(currency);
        let providers = self.ordered_providers(&currency, Need::Rate);

        let outcomes: Vec<ProviderOutcome<'_, PriceQuote>> = providers
            .into_iter()
            .map(|provider| {
                let policy = &self.policy;
                let currency = currency.as_ref();
                async move {
                    attempt_provider(provider.id(), policy, move || provider.fetch_rate(currency))
                        .await
                }
                .boxed()
            })
            .collect();

        match first_success(self.strategy, outcomes).await {
            Ok(quote) => {
                info!(
                    "Resolved BTC/{} = {} from '{}'",
                    quote.currency(),
                    quote.value(),
                    quote.source()
                );
                Ok(quote)
            }
            Err(attempts) => {
                warn!(
                    "All price sources failed for '{}' after {} attempts",
                    currency,
                    attempts.len()
                );
                Err(PriceError::AllSourcesUnavailable {
                    target: currency.to_string(),
                    attempts,
                })
            }
        }
    }

    /// Resolve BTC rates for several currencies from a batch-capable provider.
    ///
    /// Same attempt and fallback rules as [`resolve`](Self::resolve). The
    /// snapshot may lack currencies the provider did not return.
    pub async fn resolve_rates(&self, currencies: &[Currency]) -> Result<RateSnapshot, PriceError> {
        let currencies: Vec<Currency> = currencies.iter().map(|c| normalize_currency(c)).collect();
        let target = currencies.join(",");
        let providers = self.ordered_providers("", Need::Batch);

        let outcomes: Vec<ProviderOutcome<'_, RateSnapshot>> = providers
            .into_iter()
            .map(|provider| {
                let policy = &self.policy;
                let currencies = currencies.as_slice();
                async move {
                    attempt_provider(provider.id(), policy, move || provider.fetch_rates(currencies))
                        .await
                }
                .boxed()
            })
            .collect();

        first_success(self.strategy, outcomes)
            .await
            .map_err(|attempts| {
                warn!(
                    "All batch sources failed for '{}' after {} attempts",
                    target,
                    attempts.len()
                );
                PriceError::AllSourcesUnavailable { target, attempts }
            })
    }

    /// Fetch a daily price history from a history-capable provider.
    pub async fn fetch_history(
        &self,
        currency: &str,
        days: u32,
    ) -> Result<Vec<HistoricalPrice>, PriceError> {
        let currency = normalize_currency(currency);
        let providers = self.ordered_providers(&currency, Need::History);

        let outcomes: Vec<ProviderOutcome<'_, Vec<HistoricalPrice>>> = providers
            .into_iter()
            .map(|provider| {
                let policy = &self.policy;
                let currency = currency.as_ref();
                async move {
                    attempt_provider(provider.id(), policy, move || {
                        provider.fetch_daily_history(currency, days)
                    })
                    .await
                }
                .boxed()
            })
            .collect();

        first_success(self.strategy, outcomes)
            .await
            .map_err(|attempts| PriceError::AllSourcesUnavailable {
                target: format!("history:{}", currency),
                attempts,
            })
    }

    /// Providers able to serve `need` (and `currency` where relevant),
    /// ordered by priority. Equal priorities keep registration order.
    fn ordered_providers(&self, currency: &str, need: Need) -> Vec<&Arc<dyn PriceProvider>> {
        let mut providers: Vec<_> = self
            .providers
            .iter()
            .filter(|p| {
                let caps = p.capabilities();
                match need {
                    Need::Rate => caps.currencies.covers(currency),
                    Need::Batch => caps.supports_batch,
                    Need::History => caps.supports_history && caps.currencies.covers(currency),
                }
            })
            .collect();
        providers.sort_by_key(|p| p.priority());
        providers
    }

    /// Get the list of registered providers.
    pub fn providers(&self) -> &[Arc<dyn PriceProvider>] {
        &self.providers
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn strategy(&self) -> FallbackStrategy {
        self.strategy
    }
}
