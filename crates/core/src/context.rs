//! Shared in-memory holder of the latest known BTC rates.
//!
//! Owned by the application root and handed to the price services, the
//! calculators and the portfolio valuation. Cloning yields another handle
//! to the same rates.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;

use satoshi_market_data::normalize_currency;

#[derive(Clone, Debug)]
pub struct PriceContext {
    headline_currency: String,
    rates: Arc<RwLock<BTreeMap<String, Decimal>>>,
}

impl PriceContext {
    pub fn new(headline_currency: &str) -> Self {
        Self {
            headline_currency: normalize_currency(headline_currency).into_owned(),
            rates: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn headline_currency(&self) -> &str {
        &self.headline_currency
    }

    /// Latest known rate for `currency`.
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        let currency = normalize_currency(currency);
        self.rates
            .read()
            .ok()
            .and_then(|rates| rates.get(currency.as_ref()).copied())
    }

    /// Latest known rate for `currency`, else the headline currency's rate.
    pub fn rate_or_headline(&self, currency: &str) -> Option<Decimal> {
        self.rate(currency)
            .or_else(|| self.rate(&self.headline_currency))
    }

    pub fn headline_rate(&self) -> Option<Decimal> {
        self.rate(&self.headline_currency)
    }

    /// Record a rate. Non-positive values are ignored.
    pub fn set_rate(&self, currency: &str, rate: Decimal) {
        if rate <= Decimal::ZERO {
            return;
        }
        if let Ok(mut rates) = self.rates.write() {
            rates.insert(normalize_currency(currency).into_owned(), rate);
        }
    }

    /// Merge several rates at once.
    pub fn set_rates(&self, updates: &BTreeMap<String, Decimal>) {
        if let Ok(mut rates) = self.rates.write() {
            for (currency, rate) in updates {
                if *rate > Decimal::ZERO {
                    rates.insert(normalize_currency(currency).into_owned(), *rate);
                }
            }
        }
    }

    /// Copy of every known rate.
    pub fn snapshot(&self) -> BTreeMap<String, Decimal> {
        self.rates
            .read()
            .map(|rates| rates.clone())
            .unwrap_or_default()
    }
}
