use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One holding as stored under the `pf` key.
///
/// Field names match the persisted layout `{ btc, buy, fiat, exchange }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    /// BTC held, 8 decimal places.
    pub btc: Decimal,
    /// Buy price per BTC in `fiat`, 2 decimal places.
    pub buy: Decimal,
    /// Lowercase currency code.
    pub fiat: String,
    #[serde(default)]
    pub exchange: String,
}

/// Input model for adding a holding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPortfolioEntry {
    pub btc: Decimal,
    pub buy: Decimal,
    pub fiat: String,
    pub exchange: Option<String>,
}

/// A holding valued at the current rate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryValuation {
    pub index: usize,
    pub entry: PortfolioEntry,
    pub invested: Decimal,
    /// `None` when no rate is known for the entry's currency or the headline currency.
    pub current: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
}
