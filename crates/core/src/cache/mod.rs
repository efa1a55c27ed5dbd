//! Price caches.
//!
//! Two policies coexist:
//! - [`LastKnownPriceCache`] keeps the headline price forever and is only
//!   ever overwritten by a newer successful fetch.
//! - [`RatesCache`] keeps every fiat rate in one blob with a 60 s freshness
//!   window; stale values stay readable as a last resort.

mod last_known;
mod rates_cache;

pub use last_known::{CachedPrice, LastKnownPriceCache};
pub use rates_cache::{CacheEntry, RatesCache};
