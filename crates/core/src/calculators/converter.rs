//! BTC / sats / fiat conversion.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::checked_mul;
use crate::constants::{BTC_DECIMAL_PRECISION, SATS_PER_BTC};
use crate::errors::{Result, ValidationError};

/// Amount entered in the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionInput {
    Btc(Decimal),
    Sats(i64),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub btc: Decimal,
    pub sats: i64,
    pub fiat: Decimal,
    pub currency: String,
    pub rate: Decimal,
}

/// Convert BTC to satoshis, rounding half away from zero.
pub fn btc_to_sats(btc: Decimal) -> Result<i64> {
    let what = format!("{} BTC", btc);
    checked_mul(btc, Decimal::from(SATS_PER_BTC), &what)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ValidationError::out_of_range(&what).into())
}

pub fn sats_to_btc(sats: i64) -> Decimal {
    Decimal::new(sats, BTC_DECIMAL_PRECISION)
}

/// Convert a BTC or sats amount into `currency` at `rate` (units per BTC).
pub fn convert(input: ConversionInput, currency: &str, rate: Decimal) -> Result<Conversion> {
    if rate <= Decimal::ZERO {
        return Err(ValidationError::not_positive("rate").into());
    }

    let btc = match input {
        ConversionInput::Btc(btc) => btc,
        ConversionInput::Sats(sats) => sats_to_btc(sats),
    };
    if btc <= Decimal::ZERO {
        return Err(ValidationError::not_positive("amount").into());
    }

    let sats = match input {
        ConversionInput::Sats(sats) => sats,
        ConversionInput::Btc(btc) => btc_to_sats(btc)?,
    };

    Ok(Conversion {
        btc,
        sats,
        fiat: checked_mul(btc, rate, "fiat value")?,
        currency: currency.trim().to_ascii_lowercase(),
        rate,
    })
}
