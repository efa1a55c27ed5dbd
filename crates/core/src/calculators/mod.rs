//! Calculators - converter, profit estimate and DCA simulation.
//!
//! All amounts are `Decimal`. Rates are units of fiat per 1 BTC and are
//! supplied by the caller, usually from the [`PriceContext`](crate::context::PriceContext).

mod checked;
mod converter;
mod dca;
mod profit;

pub(crate) use checked::{checked_add, checked_div, checked_mul, checked_sub};
pub use converter::{btc_to_sats, convert, sats_to_btc, Conversion, ConversionInput};
pub use dca::{
    estimate_without_history, simulate_from_history, DcaFrequency, DcaPlan, DcaSimulation,
    DcaSimulator,
};
pub use profit::{estimate_profit, ProfitEstimate};
