//! Overflow-checked `Decimal` arithmetic for user-supplied amounts.

use rust_decimal::Decimal;

use crate::errors::{Result, ValidationError};

pub(crate) fn checked_mul(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| ValidationError::out_of_range(what).into())
}

pub(crate) fn checked_div(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| ValidationError::out_of_range(what).into())
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| ValidationError::out_of_range(what).into())
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| ValidationError::out_of_range(what).into())
}
