use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::PriceError;

/// Bitcoin exchange rate quoted in one currency.
///
/// Immutable once constructed; the value is always strictly positive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPriceQuote")]
pub struct PriceQuote {
    value: Decimal,
    currency: String,
    source: String,
    observed_at: DateTime<Utc>,
}

/// Wire form of [`PriceQuote`], validated through [`PriceQuote::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPriceQuote {
    value: Decimal,
    currency: String,
    source: String,
    observed_at: DateTime<Utc>,
}

impl TryFrom<RawPriceQuote> for PriceQuote {
    type Error = PriceError;

    fn try_from(raw: RawPriceQuote) -> Result<Self, Self::Error> {
        Self::new(raw.value, raw.currency, raw.source, raw.observed_at)
    }
}

impl PriceQuote {
    /// Build a quote, rejecting non-positive values as a shape error of `source`.
    pub fn new(
        value: Decimal,
        currency: impl Into<String>,
        source: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, PriceError> {
        let source = source.into();
        if value <= Decimal::ZERO {
            return Err(PriceError::shape(
                &source,
                format!("non-positive rate {}", value),
            ));
        }
        Ok(Self {
            value,
            currency: currency.into().to_ascii_lowercase(),
            source,
            observed_at,
        })
    }

    /// Exchange rate: units of `currency` per 1 BTC.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Lowercase currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Provider that produced the quote.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// When the quote was obtained.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
