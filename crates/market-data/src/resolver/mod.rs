//! Multi-provider resolution with bounded retries.
//!
//! ```text
//! resolve("usd")
//!   |
//!   v
//! eligible providers, by priority:  COINGECKO(1)  BINANCE(2)  KRAKEN(3)
//!   |
//!   v
//! per provider: attempt 1 --fail--> attempt 2 --fail--> next provider
//!               (each attempt bounded by attempt_timeout)
//!   |
//!   v
//! first success wins  |  all exhausted -> AllSourcesUnavailable
//! ```
//!
//! With [`FallbackStrategy::Race`] the per-provider loops run concurrently
//! instead of one after another; the first success still wins.

mod attempt;
mod height_resolver;
mod policy;
mod price_resolver;

pub use height_resolver::{ChainHeightResolver, BLOCK_HEIGHT_TARGET};
pub use policy::{
    FallbackStrategy, RetryPolicy, DEFAULT_ATTEMPTS_PER_PROVIDER, DEFAULT_ATTEMPT_TIMEOUT,
};
pub use price_resolver::QuotedPriceResolver;
