//! Mock upstream sources shared by the service tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use satoshi_market_data::{
    BlockHeight, BlockHeightProvider, ChainHeightResolver, Currency, CurrencyCoverage,
    FallbackStrategy, HistoricalPrice, PriceError, PriceProvider, PriceQuote,
    ProviderCapabilities, QuotedPriceResolver, RateSnapshot, RetryPolicy,
};

/// Price provider answering from a fixed rate table, or failing every call.
pub(crate) struct MockPriceProvider {
    rates: Mutex<BTreeMap<String, Decimal>>,
    history: Mutex<Option<Vec<HistoricalPrice>>>,
    failing: Mutex<bool>,
    pub(crate) rate_calls: AtomicUsize,
    pub(crate) batch_calls: AtomicUsize,
    pub(crate) history_calls: AtomicUsize,
}

impl MockPriceProvider {
    pub(crate) fn with_rates(pairs: &[(&str, Decimal)]) -> Arc<Self> {
        Arc::new(Self {
            rates: Mutex::new(pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()),
            history: Mutex::new(None),
            failing: Mutex::new(false),
            rate_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        let provider = Self::with_rates(&[]);
        provider.set_failing(true);
        provider
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub(crate) fn set_rate(&self, currency: &str, rate: Decimal) {
        self.rates.lock().unwrap().insert(currency.to_string(), rate);
    }

    /// Daily prices, one per day starting 2024-01-01.
    pub(crate) fn set_history(&self, prices: &[Decimal]) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let history = prices
            .iter()
            .enumerate()
            .map(|(i, price)| HistoricalPrice {
                timestamp: start + chrono::Duration::days(i as i64),
                price: *price,
            })
            .collect();
        *self.history.lock().unwrap() = Some(history);
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
            + self.batch_calls.load(Ordering::SeqCst)
            + self.history_calls.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> Result<(), PriceError> {
        if *self.failing.lock().unwrap() {
            return Err(PriceError::Transport {
                provider: "MOCK".to_string(),
                message: "offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            currencies: CurrencyCoverage::Any,
            supports_batch: true,
            supports_history: true,
        }
    }

    async fn fetch_rate(&self, currency: &str) -> Result<PriceQuote, PriceError> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let rate = self.rates.lock().unwrap().get(currency).copied();
        match rate {
            Some(rate) => PriceQuote::new(rate, currency, "MOCK", Utc::now()),
            None => Err(PriceError::shape("MOCK", format!("missing '{}'", currency))),
        }
    }

    async fn fetch_rates(&self, currencies: &[Currency]) -> Result<RateSnapshot, PriceError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let table = self.rates.lock().unwrap().clone();
        let rates: BTreeMap<String, Decimal> = currencies
            .iter()
            .filter_map(|c| table.get(c.as_ref()).map(|r| (c.to_string(), *r)))
            .collect();
        if rates.is_empty() {
            return Err(PriceError::shape("MOCK", "no requested currency in payload"));
        }
        Ok(RateSnapshot {
            rates,
            source: "MOCK".to_string(),
            observed_at: Utc::now(),
        })
    }

    async fn fetch_daily_history(
        &self,
        _currency: &str,
        _days: u32,
    ) -> Result<Vec<HistoricalPrice>, PriceError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let history = self.history.lock().unwrap().clone();
        history.ok_or_else(|| PriceError::shape("MOCK", "empty price history"))
    }
}

/// Single-attempt resolver over one mock provider.
pub(crate) fn resolver_for(provider: &Arc<MockPriceProvider>) -> Arc<QuotedPriceResolver> {
    let providers: Vec<Arc<dyn PriceProvider>> = vec![provider.clone()];
    Arc::new(QuotedPriceResolver::with_config(
        providers,
        RetryPolicy::new(1, std::time::Duration::from_millis(4000)),
        FallbackStrategy::Sequential,
    ))
}

/// Chain height source replaying scripted heights; `None` entries fail.
pub(crate) struct MockHeightSource {
    script: Mutex<VecDeque<Option<u64>>>,
    pub(crate) calls: AtomicUsize,
}

impl MockHeightSource {
    pub(crate) fn new(script: &[Option<u64>]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.iter().copied().collect()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl BlockHeightProvider for MockHeightSource {
    fn id(&self) -> &'static str {
        "MOCK_CHAIN"
    }

    async fn fetch_height(&self) -> Result<BlockHeight, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().flatten();
        match next {
            Some(height) => Ok(BlockHeight {
                height,
                source: "MOCK_CHAIN".to_string(),
                observed_at: Utc::now(),
            }),
            None => Err(PriceError::HttpStatus {
                provider: "MOCK_CHAIN".to_string(),
                status: 503,
            }),
        }
    }
}

pub(crate) fn height_resolver_for(source: &Arc<MockHeightSource>) -> Arc<ChainHeightResolver> {
    let sources: Vec<Arc<dyn BlockHeightProvider>> = vec![source.clone()];
    Arc::new(ChainHeightResolver::new(sources))
}
