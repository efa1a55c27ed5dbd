//! Retry and fallback configuration for the resolvers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default attempts per provider within one resolution.
pub const DEFAULT_ATTEMPTS_PER_PROVIDER: u32 = 2;

/// Default bound on a single attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(4000);

/// How many times each provider is tried and how long each try may take.
///
/// A timeout counts as one exhausted attempt, same as a transport or shape
/// failure. There is no backoff between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts_per_provider: u32,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(attempts_per_provider: u32, attempt_timeout: Duration) -> Self {
        Self {
            attempts_per_provider: attempts_per_provider.max(1),
            attempt_timeout,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS_PER_PROVIDER, DEFAULT_ATTEMPT_TIMEOUT)
    }
}

/// How eligible providers are combined.
///
/// Both strategies are first-success-wins: the first provider to produce a
/// value ends the resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Provider N+1 is only started after provider N exhausts its attempts.
    #[default]
    Sequential,
    /// All providers run their attempt loops concurrently; the rest are
    /// cancelled as soon as one succeeds.
    Race,
}

impl fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Race => write!(f, "race"),
        }
    }
}

impl FromStr for FallbackStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "race" => Ok(Self::Race),
            other => Err(format!("unknown fallback strategy '{}'", other)),
        }
    }
}
