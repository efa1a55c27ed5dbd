//! Kraken provider.
//!
//! Quotes the XBT/USD pair.
//!
//! Endpoint: `/0/public/Ticker?pair=XXBTZUSD` ->
//! `{"error":[],"result":{"XXBTZUSD":{"c":["64250.10000","0.0012"], ...}}}`
//! where `c` is `[last trade price, lot volume]`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::PriceError;
use crate::models::PriceQuote;
use crate::provider::http::{build_client, get_text, parse_json, positive_decimal};
use crate::provider::{CurrencyCoverage, PriceProvider, ProviderCapabilities};

const BASE_URL: &str = "https://api.kraken.com";
const PROVIDER_ID: &str = "KRAKEN";
const PAIR: &str = "XXBTZUSD";
const SUPPORTED_CURRENCIES: &[&str] = &["usd"];

/// Kraken public ticker provider.
pub struct KrakenProvider {
    client: Client,
    base_url: String,
}

impl KrakenProvider {
    pub fn new() -> Result<Self, PriceError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PriceError> {
        Ok(Self {
            client: build_client(PROVIDER_ID)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Take the first entry of `result` and read `c[0]`.
///
/// Kraken keys the result by its own pair alias, so the key itself is ignored.
fn parse_last_trade(payload: &Value) -> Result<Decimal, PriceError> {
    if let Some(errors) = payload.get("error").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            return Err(PriceError::shape(PROVIDER_ID, format!("api error: {}", first)));
        }
    }

    let ticker = payload
        .get("result")
        .and_then(Value::as_object)
        .and_then(|result| result.values().next())
        .ok_or_else(|| PriceError::shape(PROVIDER_ID, "missing 'result'"))?;

    let last = ticker
        .get("c")
        .and_then(Value::as_array)
        .and_then(|c| c.first());
    positive_decimal(PROVIDER_ID, last, "c[0]")
}

#[async_trait]
impl PriceProvider for KrakenProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            currencies: CurrencyCoverage::Only(SUPPORTED_CURRENCIES),
            supports_batch: false,
            supports_history: false,
        }
    }

    async fn fetch_rate(&self, currency: &str) -> Result<PriceQuote, PriceError> {
        if !SUPPORTED_CURRENCIES.contains(&currency) {
            return Err(PriceError::UnsupportedCurrency {
                provider: PROVIDER_ID.to_string(),
                currency: currency.to_string(),
            });
        }

        let url = format!("{}/0/public/Ticker", self.base_url);
        let body = get_text(&self.client, PROVIDER_ID, &url, &[("pair", PAIR)]).await?;
        let price = parse_last_trade(&parse_json(PROVIDER_ID, &body)?)?;
        PriceQuote::new(price, currency, PROVIDER_ID, Utc::now())
    }
}
