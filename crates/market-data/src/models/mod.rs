//! Market data models
//!
//! This module contains the core data types for price operations:
//! - `types` - Type aliases for common identifiers (ProviderId, Currency)
//! - `quote` - Single-currency price quote (PriceQuote)
//! - `rates` - Multi-currency rate snapshot (RateSnapshot)
//! - `history` - Daily price history points (HistoricalPrice)
//! - `chain` - Chain tip height observation (BlockHeight)

mod chain;
mod history;
mod quote;
mod rates;
mod types;

pub use chain::BlockHeight;
pub use history::HistoricalPrice;
pub use quote::PriceQuote;
pub use rates::RateSnapshot;
pub use types::{normalize_currency, Currency, ProviderId};
