use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point of a daily price series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}
