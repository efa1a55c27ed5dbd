//! Satoshi Core - Caches, price services, calculators and refresh scheduling.
//!
//! This crate contains the dashboard logic on top of `satoshi-market-data`.
//! It is storage-agnostic: persistence goes through the [`kv::KeyValueStore`]
//! trait, implemented in memory here and on disk by the `storage-file` crate.

pub mod cache;
pub mod calculators;
pub mod clock;
pub mod constants;
pub mod context;
pub mod errors;
pub mod events;
pub mod halving;
pub mod kv;
pub mod portfolio;
pub mod prices;
pub mod scheduler;

#[cfg(test)]
mod test_support;

pub use context::PriceContext;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
