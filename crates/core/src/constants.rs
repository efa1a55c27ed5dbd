use std::time::Duration;

/// Storage key of the headline price for a currency (suffix is the lowercase code)
pub const LAST_PRICE_KEY_PREFIX: &str = "last_price_";

/// Storage key of the headline price timestamp (epoch milliseconds)
pub const LAST_PRICE_TS_KEY: &str = "last_price_ts";

/// Storage key of the multi-currency rates blob
pub const RATES_CACHE_KEY: &str = "btc_px_converter";

/// Storage key of the portfolio rows
pub const PORTFOLIO_KEY: &str = "pf";

/// Freshness window of the multi-currency rates blob
pub const RATES_TTL: Duration = Duration::from_secs(60);

/// Headline price refresh period
pub const PRICE_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Chain height refresh period
pub const CHAIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Currency shown in the headline price
pub const DEFAULT_HEADLINE_CURRENCY: &str = "usd";

/// Fiat currencies offered by the tools
pub const DEFAULT_FIAT_CURRENCIES: [&str; 15] = [
    "usd", "eur", "aud", "inr", "gbp", "jpy", "pkr", "rub", "mxn", "ngn", "ars", "try", "idr",
    "php", "vnd",
];

/// Satoshis per bitcoin
pub const SATS_PER_BTC: i64 = 100_000_000;

/// Decimal places kept for BTC amounts
pub const BTC_DECIMAL_PRECISION: u32 = 8;

/// Decimal places kept for fiat amounts
pub const FIAT_DECIMAL_PRECISION: u32 = 2;
