//! CoinGecko provider.
//!
//! Serves every fiat currency CoinGecko lists, several currencies per request,
//! and the daily price history used by the DCA simulator.
//!
//! Endpoints:
//! - `/api/v3/simple/price?ids=bitcoin&vs_currencies=usd,eur` -> `{"bitcoin":{"usd":64250.1,"eur":59100.4}}`
//! - `/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=90&interval=daily` -> `{"prices":[[ms, price], ...]}`

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::errors::PriceError;
use crate::models::{Currency, HistoricalPrice, PriceQuote, RateSnapshot};
use crate::provider::http::{build_client, get_text, parse_json, positive_decimal};
use crate::provider::{CurrencyCoverage, PriceProvider, ProviderCapabilities};

const BASE_URL: &str = "https://api.coingecko.com";
const PROVIDER_ID: &str = "COINGECKO";
const COIN_ID: &str = "bitcoin";

/// CoinGecko price provider (no API key required).
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Result<Self, PriceError> {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a different host (mirrors, proxies, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PriceError> {
        Ok(Self {
            client: build_client(PROVIDER_ID)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn simple_price(&self, vs_currencies: &str) -> Result<Value, PriceError> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let body = get_text(
            &self.client,
            PROVIDER_ID,
            &url,
            &[("ids", COIN_ID), ("vs_currencies", vs_currencies)],
        )
        .await?;
        parse_json(PROVIDER_ID, &body)
    }
}

/// Extract `bitcoin.<currency>` from a simple/price payload.
fn parse_rate(payload: &Value, currency: &str) -> Result<rust_decimal::Decimal, PriceError> {
    let coin = payload
        .get(COIN_ID)
        .ok_or_else(|| PriceError::shape(PROVIDER_ID, format!("missing '{}'", COIN_ID)))?;
    positive_decimal(
        PROVIDER_ID,
        coin.get(currency),
        &format!("{}.{}", COIN_ID, currency),
    )
}

/// Extract every positive `bitcoin.<currency>` rate from a simple/price payload.
///
/// Entries that are missing or malformed are dropped; a payload that yields
/// no rate at all is a shape error.
fn parse_rates(
    payload: &Value,
    currencies: &[Currency],
) -> Result<BTreeMap<String, rust_decimal::Decimal>, PriceError> {
    let coin = payload
        .get(COIN_ID)
        .and_then(Value::as_object)
        .ok_or_else(|| PriceError::shape(PROVIDER_ID, format!("missing '{}'", COIN_ID)))?;

    let mut rates = BTreeMap::new();
    for currency in currencies {
        match positive_decimal(PROVIDER_ID, coin.get(currency.as_ref()), currency) {
            Ok(rate) => {
                rates.insert(currency.to_string(), rate);
            }
            Err(e) => debug!("Dropping {} from batch: {}", currency, e),
        }
    }

    if rates.is_empty() {
        return Err(PriceError::shape(PROVIDER_ID, "no requested currency in payload"));
    }
    Ok(rates)
}

/// Extract the `prices` series from a market_chart payload.
fn parse_history(payload: &Value) -> Result<Vec<HistoricalPrice>, PriceError> {
    let points = payload
        .get("prices")
        .and_then(Value::as_array)
        .ok_or_else(|| PriceError::shape(PROVIDER_ID, "missing 'prices'"))?;

    let mut history = Vec::with_capacity(points.len());
    for point in points {
        let pair = match point.as_array() {
            Some(pair) if pair.len() >= 2 => pair,
            _ => continue,
        };
        let Some(ms) = pair[0].as_f64() else { continue };
        let Some(timestamp) = Utc.timestamp_millis_opt(ms as i64).single() else {
            continue;
        };
        if let Ok(price) = positive_decimal(PROVIDER_ID, Some(&pair[1]), "price") {
            history.push(HistoricalPrice { timestamp, price });
        }
    }

    if history.is_empty() {
        return Err(PriceError::shape(PROVIDER_ID, "empty price history"));
    }
    history.sort_by_key(|p| p.timestamp);
    Ok(history)
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            currencies: CurrencyCoverage::Any,
            supports_batch: true,
            supports_history: true,
        }
    }

    async fn fetch_rate(&self, currency: &str) -> Result<PriceQuote, PriceError> {
        let payload = self.simple_price(currency).await?;
        let rate = parse_rate(&payload, currency)?;
        PriceQuote::new(rate, currency, PROVIDER_ID, Utc::now())
    }

    async fn fetch_rates(&self, currencies: &[Currency]) -> Result<RateSnapshot, PriceError> {
        let joined = currencies
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        let payload = self.simple_price(&joined).await?;
        let rates = parse_rates(&payload, currencies)?;
        Ok(RateSnapshot {
            rates,
            source: PROVIDER_ID.to_string(),
            observed_at: Utc::now(),
        })
    }

    async fn fetch_daily_history(
        &self,
        currency: &str,
        days: u32,
    ) -> Result<Vec<HistoricalPrice>, PriceError> {
        let url = format!("{}/api/v3/coins/{}/market_chart", self.base_url, COIN_ID);
        let days = days.max(1).to_string();
        let body = get_text(
            &self.client,
            PROVIDER_ID,
            &url,
            &[
                ("vs_currency", currency),
                ("days", days.as_str()),
                ("interval", "daily"),
            ],
        )
        .await?;
        parse_history(&parse_json(PROVIDER_ID, &body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::borrow::Cow;

    #[test]
    fn test_provider_identity() {
        let provider = CoinGeckoProvider::new().unwrap();
        assert_eq!(provider.id(), "COINGECKO");
        assert_eq!(provider.priority(), 1);
        let caps = provider.capabilities();
        assert!(caps.currencies.covers("php"));
        assert!(caps.supports_batch);
        assert!(caps.supports_history);
    }

    #[test]
    fn test_parse_rate() {
        let payload = json!({"bitcoin": {"usd": 64250.12}});
        assert_eq!(parse_rate(&payload, "usd").unwrap(), dec!(64250.12));
    }

    #[test]
    fn test_parse_rate_missing_field_is_shape() {
        let payload = json!({"bitcoin": {}});
        assert_eq!(parse_rate(&payload, "usd").unwrap_err().kind(), ErrorKind::Shape);

        let payload = json!({"status": {"error_code": 429}});
        assert_eq!(parse_rate(&payload, "usd").unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_parse_rates_keeps_valid_entries() {
        let payload = json!({"bitcoin": {"usd": 64000, "eur": 59000.5, "jpy": 0}});
        let currencies = vec![
            Cow::Borrowed("usd"),
            Cow::Borrowed("eur"),
            Cow::Borrowed("jpy"),
            Cow::Borrowed("gbp"),
        ];
        let rates = parse_rates(&payload, &currencies).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates["usd"], dec!(64000));
        assert_eq!(rates["eur"], dec!(59000.5));
    }

    #[test]
    fn test_parse_rates_empty_is_shape() {
        let payload = json!({"bitcoin": {}});
        let currencies = vec![Cow::Borrowed("usd")];
        assert_eq!(
            parse_rates(&payload, &currencies).unwrap_err().kind(),
            ErrorKind::Shape
        );
    }

    #[test]
    fn test_parse_history_sorted() {
        let payload = json!({
            "prices": [
                [1_700_086_400_000i64, 37000.0],
                [1_700_000_000_000i64, 36500.5],
                ["bad"],
                [1_700_172_800_000i64, 37500.25]
            ]
        });
        let history = parse_history(&payload).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].price, dec!(36500.5));
        assert_eq!(history[2].price, dec!(37500.25));
        assert!(history[0].timestamp < history[1].timestamp);
    }

    #[test]
    fn test_parse_history_missing_prices_is_shape() {
        let payload = json!({"error": "coin not found"});
        assert_eq!(parse_history(&payload).unwrap_err().kind(), ErrorKind::Shape);
    }
}
