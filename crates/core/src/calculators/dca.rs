//! Dollar-cost-averaging simulator.
//!
//! Replays fixed-amount purchases over a daily price history, walking
//! backwards from the most recent day in steps of 7 (weekly) or 30
//! (monthly) days. When no history is available the result is estimated
//! from the latest known rate alone.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use satoshi_market_data::{normalize_currency, HistoricalPrice, QuotedPriceResolver};

use super::{checked_add, checked_div, checked_mul};
use crate::context::PriceContext;
use crate::errors::{Error, Result, ValidationError};

/// Days of history requested per simulated month.
const DAYS_PER_MONTH: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DcaFrequency {
    Weekly,
    Monthly,
}

impl DcaFrequency {
    /// Days between two simulated purchases.
    pub fn step_days(self) -> usize {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }
}

impl fmt::Display for DcaFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for DcaFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown frequency '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DcaPlan {
    /// Fiat spent per purchase.
    pub amount: Decimal,
    pub months: u32,
    pub frequency: DcaFrequency,
}

impl DcaPlan {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::not_positive("amount").into());
        }
        if self.months == 0 {
            return Err(ValidationError::not_positive("months").into());
        }
        Ok(())
    }

    /// Length of history to request.
    pub fn history_days(&self) -> u32 {
        self.months.saturating_mul(DAYS_PER_MONTH).max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaSimulation {
    pub currency: String,
    /// Number of purchases. Not counted for estimates.
    pub buys: Option<u32>,
    pub invested: Decimal,
    pub btc: Decimal,
    /// Not available for estimates.
    pub average_cost: Option<Decimal>,
    pub current_value: Decimal,
    /// True when history was unavailable and the latest rate was used instead.
    pub estimated: bool,
}

/// Replay `plan` over `history` (ascending by time).
///
/// The current value uses `current_rate` when known, else the most recent
/// price in the history.
pub fn simulate_from_history(
    plan: &DcaPlan,
    currency: &str,
    history: &[HistoricalPrice],
    current_rate: Option<Decimal>,
) -> Result<DcaSimulation> {
    plan.validate()?;
    let last = history
        .last()
        .ok_or_else(|| Error::PriceUnavailable(format!("history:{}", currency)))?;

    let mut buys = 0u32;
    let mut invested = Decimal::ZERO;
    let mut btc = Decimal::ZERO;
    for point in history.iter().rev().step_by(plan.frequency.step_days()) {
        if point.price <= Decimal::ZERO {
            continue;
        }
        invested = checked_add(invested, plan.amount, "invested amount")?;
        let bought = checked_div(plan.amount, point.price, "BTC bought")?;
        btc = checked_add(btc, bought, "BTC acquired")?;
        buys += 1;
    }

    let average_cost = if btc > Decimal::ZERO {
        Some(checked_div(invested, btc, "average cost")?)
    } else {
        None
    };
    let rate = current_rate.unwrap_or(last.price);

    Ok(DcaSimulation {
        currency: currency.to_string(),
        buys: Some(buys),
        invested,
        btc,
        average_cost,
        current_value: checked_mul(btc, rate, "current value")?,
        estimated: false,
    })
}

/// Rough result from the latest rate only: every month's amount bought at `rate`.
pub fn estimate_without_history(
    plan: &DcaPlan,
    currency: &str,
    rate: Decimal,
) -> Result<DcaSimulation> {
    plan.validate()?;
    if rate <= Decimal::ZERO {
        return Err(ValidationError::not_positive("rate").into());
    }

    let invested = checked_mul(plan.amount, Decimal::from(plan.months), "invested amount")?;
    let btc = checked_div(invested, rate, "BTC acquired")?;
    Ok(DcaSimulation {
        currency: currency.to_string(),
        buys: None,
        invested,
        btc,
        average_cost: None,
        current_value: checked_mul(btc, rate, "current value")?,
        estimated: true,
    })
}

/// Runs DCA simulations against live history with an estimate fallback.
pub struct DcaSimulator {
    resolver: Arc<QuotedPriceResolver>,
    context: PriceContext,
}

impl DcaSimulator {
    pub fn new(resolver: Arc<QuotedPriceResolver>, context: PriceContext) -> Self {
        Self { resolver, context }
    }

    pub async fn simulate(&self, plan: &DcaPlan, currency: &str) -> Result<DcaSimulation> {
        plan.validate()?;
        let currency = normalize_currency(currency);

        match self
            .resolver
            .fetch_history(&currency, plan.history_days())
            .await
        {
            Ok(history) if !history.is_empty() => {
                let current_rate = self.context.rate(&currency);
                return simulate_from_history(plan, &currency, &history, current_rate);
            }
            Ok(_) => warn!("Empty price history for '{}'", currency),
            Err(e) => warn!("Price history for '{}' unavailable: {}", currency, e),
        }

        match self.context.rate_or_headline(&currency) {
            Some(rate) => estimate_without_history(plan, &currency, rate),
            None => Err(Error::PriceUnavailable(currency.into_owned())),
        }
    }
}
