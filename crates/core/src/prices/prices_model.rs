use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use satoshi_market_data::PriceQuote;

/// What the headline price display should show after a refresh.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PriceStatus {
    /// A provider answered during this refresh.
    Live { quote: PriceQuote },

    /// Every provider failed; showing the last successfully stored value.
    #[serde(rename_all = "camelCase")]
    LastKnown {
        currency: String,
        value: Decimal,
        captured_at: Option<DateTime<Utc>>,
    },

    /// Every provider failed and nothing was ever stored.
    Unavailable { currency: String },
}

impl PriceStatus {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Live { quote } => Some(quote.value()),
            Self::LastKnown { value, .. } => Some(*value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn currency(&self) -> &str {
        match self {
            Self::Live { quote } => quote.currency(),
            Self::LastKnown { currency, .. } | Self::Unavailable { currency } => currency,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

/// How a converter rate was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RateFreshness {
    /// Served from a cache entry inside the freshness window.
    Cached,
    /// Fetched during this call.
    Live,
    /// Served from an expired cache entry after every provider failed.
    LastKnown,
}

/// A BTC rate for the converter and tools.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterPrice {
    pub currency: String,
    pub rate: Decimal,
    pub freshness: RateFreshness,
}
