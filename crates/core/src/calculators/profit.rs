//! Profit estimate for a holding sold at a target price.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{checked_mul, checked_sub};
use crate::errors::{Result, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitEstimate {
    pub invested: Decimal,
    pub projected: Decimal,
    /// Negative for a loss.
    pub profit: Decimal,
}

impl ProfitEstimate {
    pub fn is_loss(&self) -> bool {
        self.profit < Decimal::ZERO
    }
}

pub fn estimate_profit(btc: Decimal, avg_buy: Decimal, target: Decimal) -> Result<ProfitEstimate> {
    if btc <= Decimal::ZERO {
        return Err(ValidationError::not_positive("btc").into());
    }
    if avg_buy < Decimal::ZERO {
        return Err(ValidationError::negative("average buy price").into());
    }
    if target < Decimal::ZERO {
        return Err(ValidationError::negative("target price").into());
    }

    let invested = checked_mul(btc, avg_buy, "invested amount")?;
    let projected = checked_mul(btc, target, "projected value")?;
    Ok(ProfitEstimate {
        invested,
        projected,
        profit: checked_sub(projected, invested, "profit")?,
    })
}
