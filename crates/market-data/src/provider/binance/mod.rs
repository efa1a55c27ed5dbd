//! Binance provider.
//!
//! Quotes the BTC/USDT spot pair, reported as USD.
//!
//! Endpoint: `/api/v3/ticker/price?symbol=BTCUSDT` -> `{"symbol":"BTCUSDT","price":"64250.12000000"}`

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::PriceError;
use crate::models::PriceQuote;
use crate::provider::http::{build_client, get_text, parse_json, positive_decimal};
use crate::provider::{CurrencyCoverage, PriceProvider, ProviderCapabilities};

const BASE_URL: &str = "https://api.binance.com";
const PROVIDER_ID: &str = "BINANCE";
const SYMBOL: &str = "BTCUSDT";
const SUPPORTED_CURRENCIES: &[&str] = &["usd"];

/// Binance spot ticker provider.
pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
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

fn parse_price(payload: &Value) -> Result<Decimal, PriceError> {
    positive_decimal(PROVIDER_ID, payload.get("price"), "price")
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
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

        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let body = get_text(&self.client, PROVIDER_ID, &url, &[("symbol", SYMBOL)]).await?;
        let price = parse_price(&parse_json(PROVIDER_ID, &body)?)?;
        PriceQuote::new(price, currency, PROVIDER_ID, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_provider_identity() {
        let provider = BinanceProvider::new().unwrap();
        assert_eq!(provider.id(), "BINANCE");
        assert_eq!(provider.priority(), 2);
        let caps = provider.capabilities();
        assert!(caps.currencies.covers("usd"));
        assert!(!caps.currencies.covers("eur"));
        assert!(!caps.supports_batch);
        assert!(!caps.supports_history);
    }

    #[test]
    fn test_parse_price() {
        let payload = json!({"symbol": "BTCUSDT", "price": "64250.12000000"});
        assert_eq!(parse_price(&payload).unwrap(), dec!(64250.12));
    }

    #[test]
    fn test_parse_price_error_payload_is_shape() {
        let payload = json!({"code": -1121, "msg": "Invalid symbol."});
        assert_eq!(parse_price(&payload).unwrap_err().kind(), ErrorKind::Shape);
    }

    #[tokio::test]
    async fn test_unsupported_currency_short_circuits() {
        let provider = BinanceProvider::with_base_url("http://127.0.0.1:9").unwrap();
        let err = provider.fetch_rate("eur").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
