//! Core error types for the Satoshi dashboard.
//!
//! Storage-specific errors (file I/O, etc.) are converted to these types by
//! the storage layer. Upstream failures arrive as [`PriceError`] and are kept
//! intact so callers can still inspect the failed attempts.

use satoshi_market_data::PriceError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the dashboard core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] PriceError),

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No live source answered and nothing usable is cached.
    #[error("Price unavailable for '{0}'")]
    PriceUnavailable(String),

    #[error("CSV export failed: {0}")]
    Csv(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Rejected user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("No portfolio entry at index {0}")]
    NoSuchEntry(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ValidationError {
    pub fn not_positive(field: &str) -> Self {
        Self::NotPositive {
            field: field.to_string(),
        }
    }

    pub fn negative(field: &str) -> Self {
        Self::Negative {
            field: field.to_string(),
        }
    }

    pub fn out_of_range(what: &str) -> Self {
        Self::InvalidInput(format!("{} is out of range", what))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}
