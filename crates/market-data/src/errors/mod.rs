//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`PriceError`]: The main error enum for all price and chain-height operations
//! - [`ErrorKind`]: Coarse classification used by the resolver and callers
//! - [`ProviderAttempt`]: Record of a single failed attempt, carried by
//!   [`PriceError::AllSourcesUnavailable`]

mod kind;

pub use kind::ErrorKind;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Record of one failed attempt against one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderAttempt {
    /// Provider that was queried.
    pub provider: String,
    /// 1-based attempt number for this provider within a single resolution.
    pub attempt: u32,
    /// Rendered error for diagnostics.
    pub error: String,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}: {}", self.provider, self.attempt, self.error)
    }
}

/// Errors that can occur while acquiring prices or chain data.
///
/// Each variant is classified into an [`ErrorKind`] via [`kind`](Self::kind).
#[derive(Error, Debug)]
pub enum PriceError {
    /// The request could not be sent, or the connection failed mid-flight.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that was being queried
        provider: String,
        /// Underlying failure
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {provider}")]
    HttpStatus {
        /// The provider that answered
        provider: String,
        /// Status code returned
        status: u16,
    },

    /// The attempt did not complete within the configured bound.
    #[error("Timeout: {provider} after {}ms", .after.as_millis())]
    Timeout {
        /// The provider that timed out
        provider: String,
        /// The bound that elapsed
        after: Duration,
    },

    /// The response parsed but did not contain the expected field.
    #[error("Unexpected response shape from {provider}: {message}")]
    Shape {
        /// The provider whose payload was rejected
        provider: String,
        /// What was missing or malformed
        message: String,
    },

    /// The provider cannot quote the requested currency.
    #[error("Currency '{currency}' not supported by {provider}")]
    UnsupportedCurrency {
        /// The provider that was asked
        provider: String,
        /// Lowercase currency code
        currency: String,
    },

    /// The provider does not implement the requested operation.
    #[error("Operation '{operation}' not supported by {provider}")]
    NotSupported {
        /// Operation name (e.g., "batch_rates", "history")
        operation: String,
        /// The provider that was asked
        provider: String,
    },

    /// Every eligible provider exhausted its attempts.
    #[error("All sources unavailable for '{target}' ({} failed attempts)", .attempts.len())]
    AllSourcesUnavailable {
        /// What was being resolved (currency code, currency list, or "block_height")
        target: String,
        /// Every failed attempt, in the order they finished
        attempts: Vec<ProviderAttempt>,
    },
}

impl PriceError {
    /// Returns the classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use satoshi_market_data::errors::{ErrorKind, PriceError};
    ///
    /// let error = PriceError::Shape {
    ///     provider: "BINANCE".to_string(),
    ///     message: "missing 'price'".to_string(),
    /// };
    /// assert_eq!(error.kind(), ErrorKind::Shape);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::Timeout { .. } => {
                ErrorKind::Transport
            }
            Self::Shape { .. } => ErrorKind::Shape,
            Self::UnsupportedCurrency { .. } | Self::NotSupported { .. } => ErrorKind::Unsupported,
            Self::AllSourcesUnavailable { .. } => ErrorKind::AllSourcesUnavailable,
        }
    }

    /// Shorthand for building a [`PriceError::Shape`].
    pub fn shape(provider: &str, message: impl Into<String>) -> Self {
        Self::Shape {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Failed attempts carried by an exhausted resolution, empty otherwise.
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::AllSourcesUnavailable { attempts, .. } => attempts,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_family_is_transport() {
        let network = PriceError::Transport {
            provider: "COINGECKO".to_string(),
            message: "connection reset".to_string(),
        };
        let status = PriceError::HttpStatus {
            provider: "COINGECKO".to_string(),
            status: 503,
        };
        let timeout = PriceError::Timeout {
            provider: "KRAKEN".to_string(),
            after: Duration::from_millis(4000),
        };
        assert_eq!(network.kind(), ErrorKind::Transport);
        assert_eq!(status.kind(), ErrorKind::Transport);
        assert_eq!(timeout.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_shape_is_shape() {
        let error = PriceError::shape("KRAKEN", "missing 'result'");
        assert_eq!(error.kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_unsupported_family() {
        let currency = PriceError::UnsupportedCurrency {
            provider: "BINANCE".to_string(),
            currency: "eur".to_string(),
        };
        let operation = PriceError::NotSupported {
            operation: "history".to_string(),
            provider: "KRAKEN".to_string(),
        };
        assert_eq!(currency.kind(), ErrorKind::Unsupported);
        assert_eq!(operation.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_all_sources_unavailable_carries_attempts() {
        let error = PriceError::AllSourcesUnavailable {
            target: "usd".to_string(),
            attempts: vec![ProviderAttempt {
                provider: "COINGECKO".to_string(),
                attempt: 1,
                error: "HTTP 429 from COINGECKO".to_string(),
            }],
        };
        assert_eq!(error.kind(), ErrorKind::AllSourcesUnavailable);
        assert_eq!(error.attempts().len(), 1);
        assert_eq!(
            format!("{}", error),
            "All sources unavailable for 'usd' (1 failed attempts)"
        );
    }

    #[test]
    fn test_error_display() {
        let error = PriceError::Timeout {
            provider: "BINANCE".to_string(),
            after: Duration::from_millis(4000),
        };
        assert_eq!(format!("{}", error), "Timeout: BINANCE after 4000ms");

        let error = PriceError::HttpStatus {
            provider: "KRAKEN".to_string(),
            status: 502,
        };
        assert_eq!(format!("{}", error), "HTTP 502 from KRAKEN");

        let attempt = ProviderAttempt {
            provider: "KRAKEN".to_string(),
            attempt: 2,
            error: "boom".to_string(),
        };
        assert_eq!(attempt.to_string(), "KRAKEN#2: boom");
    }
}
