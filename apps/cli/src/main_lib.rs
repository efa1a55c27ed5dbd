use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use satoshi_core::{
    cache::{LastKnownPriceCache, RatesCache},
    calculators::DcaSimulator,
    clock::{Clock, SystemClock},
    halving::HalvingService,
    kv::KeyValueStore,
    portfolio::PortfolioService,
    prices::{ConverterPriceService, HeadlinePriceService},
    PriceContext,
};
use satoshi_market_data::{
    default_height_providers, default_price_providers, ChainHeightResolver, Currency,
    QuotedPriceResolver, RetryPolicy,
};
use satoshi_storage_file::FileKeyValueStore;

use crate::config::Config;

/// Installs the global subscriber. `log` records from the library crates are
/// bridged into it.
pub fn init_tracing() {
    let log_format = std::env::var("SATOSHI_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Services shared by every subcommand.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub context: PriceContext,
    pub resolver: Arc<QuotedPriceResolver>,
    pub converter: ConverterPriceService,
    pub portfolio: PortfolioService,
    pub halving: Arc<HalvingService>,
    pub dca: DcaSimulator,
}

impl AppState {
    /// Headline service for `currency`, sharing this state's store and context.
    pub fn headline_service(&self, currency: &str) -> HeadlinePriceService {
        let context = if currency == self.context.headline_currency() {
            self.context.clone()
        } else {
            PriceContext::new(currency)
        };
        HeadlinePriceService::new(
            self.resolver.clone(),
            LastKnownPriceCache::new(self.store.clone(), self.clock.clone()),
            context,
        )
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_path));
    tracing::info!("Data file in use: {}", config.data_path.display());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let policy = RetryPolicy::new(config.attempts_per_provider, config.attempt_timeout);
    let resolver = Arc::new(QuotedPriceResolver::with_config(
        default_price_providers().context("Failed to set up price providers")?,
        policy.clone(),
        config.fallback,
    ));
    let height_resolver = Arc::new(ChainHeightResolver::with_config(
        default_height_providers().context("Failed to set up chain height providers")?,
        RetryPolicy::new(1, policy.attempt_timeout),
        config.fallback,
    ));

    let context = PriceContext::new(&config.headline_currency);
    let rates_cache = RatesCache::with_ttl(store.clone(), clock.clone(), config.rates_ttl);

    // Seed the context so calculators have a rate before the first refresh.
    match rates_cache.entry() {
        Ok(Some(entry)) => context.set_rates(&entry.rates),
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to read cached rates: {}", e),
    }
    match LastKnownPriceCache::new(store.clone(), clock.clone()).get(&config.headline_currency) {
        Ok(Some(cached)) => context.set_rate(&config.headline_currency, cached.value),
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to read cached headline price: {}", e),
    }

    let currencies: Vec<Currency> = config
        .fiat_currencies
        .iter()
        .map(|c| Cow::Owned(c.clone()))
        .collect();
    let converter =
        ConverterPriceService::new(resolver.clone(), rates_cache, context.clone(), currencies);

    let portfolio = PortfolioService::new(store.clone());
    let halving = Arc::new(HalvingService::new(height_resolver.clone(), clock.clone()));
    let dca = DcaSimulator::new(resolver.clone(), context.clone());

    Ok(Arc::new(AppState {
        config: config.clone(),
        store,
        clock,
        context,
        resolver,
        converter,
        portfolio,
        halving,
        dca,
    }))
}
