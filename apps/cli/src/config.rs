use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use satoshi_core::constants::{
    CHAIN_REFRESH_INTERVAL, DEFAULT_FIAT_CURRENCIES, DEFAULT_HEADLINE_CURRENCY,
    PRICE_REFRESH_INTERVAL, RATES_TTL,
};
use satoshi_market_data::{
    normalize_currency, FallbackStrategy, DEFAULT_ATTEMPTS_PER_PROVIDER, DEFAULT_ATTEMPT_TIMEOUT,
};

const DEFAULT_DATA_PATH: &str = "./data/satoshi.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SATOSHI_FALLBACK: {0}")]
    InvalidFallback(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Key-value file holding caches and the portfolio.
    pub data_path: PathBuf,
    pub headline_currency: String,
    /// Currencies refreshed together for the converter.
    pub fiat_currencies: Vec<String>,
    pub price_interval: Duration,
    pub chain_interval: Duration,
    pub attempts_per_provider: u32,
    pub attempt_timeout: Duration,
    pub fallback: FallbackStrategy,
    pub rates_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_path = var("SATOSHI_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let headline_currency = var("SATOSHI_HEADLINE_CURRENCY")
            .map(|c| normalize_currency(&c).into_owned())
            .unwrap_or_else(|| DEFAULT_HEADLINE_CURRENCY.to_string());

        let fiat_currencies = var("SATOSHI_FIAT_CURRENCIES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(|c| normalize_currency(c).into_owned())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_FIAT_CURRENCIES
                    .iter()
                    .map(|c| c.to_string())
                    .collect()
            });

        let secs = |key: &str, default: Duration| {
            Duration::from_secs(positive_or_default(key, var(key), default.as_secs()))
        };

        let fallback = match var("SATOSHI_FALLBACK") {
            Some(raw) => FallbackStrategy::from_str(&raw).map_err(ConfigError::InvalidFallback)?,
            None => FallbackStrategy::default(),
        };

        Ok(Self {
            data_path,
            headline_currency,
            fiat_currencies,
            price_interval: secs("SATOSHI_PRICE_INTERVAL_SECS", PRICE_REFRESH_INTERVAL),
            chain_interval: secs("SATOSHI_CHAIN_INTERVAL_SECS", CHAIN_REFRESH_INTERVAL),
            attempts_per_provider: positive_or_default(
                "SATOSHI_ATTEMPTS_PER_PROVIDER",
                var("SATOSHI_ATTEMPTS_PER_PROVIDER"),
                DEFAULT_ATTEMPTS_PER_PROVIDER,
            ),
            attempt_timeout: Duration::from_millis(positive_or_default(
                "SATOSHI_ATTEMPT_TIMEOUT_MS",
                var("SATOSHI_ATTEMPT_TIMEOUT_MS"),
                DEFAULT_ATTEMPT_TIMEOUT.as_millis() as u64,
            )),
            fallback,
            rates_ttl: secs("SATOSHI_RATES_TTL_SECS", RATES_TTL),
        })
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy,
{
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}'; using default", key, raw);
            default
        }),
        None => default,
    }
}

/// Parses `raw` as a positive number, warning and using `default` otherwise.
fn positive_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + Default + PartialEq + std::fmt::Display,
{
    let value = parse_or_default(key, raw, default);
    if value == T::default() {
        tracing::warn!("{} must be greater than zero; using {}", key, default);
        return default;
    }
    value
}
