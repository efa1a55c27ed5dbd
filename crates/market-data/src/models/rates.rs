use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bitcoin rates for several currencies captured by one provider call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    /// Lowercase currency code -> units per 1 BTC. Only positive rates are kept.
    pub rates: BTreeMap<String, Decimal>,
    /// Provider that produced the snapshot.
    pub source: String,
    /// When the snapshot was obtained.
    pub observed_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
