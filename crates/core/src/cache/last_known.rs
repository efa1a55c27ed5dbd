use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::constants::{LAST_PRICE_KEY_PREFIX, LAST_PRICE_TS_KEY};
use crate::errors::Result;
use crate::kv::KeyValueStore;

/// A headline price read back from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedPrice {
    pub value: Decimal,
    /// When the price was stored. `None` if the timestamp key is missing or unreadable.
    pub captured_at: Option<DateTime<Utc>>,
}

/// Single-currency "last known" cache for the headline price.
///
/// Values never expire. The price is stored as a decimal string under
/// `last_price_<cur>` and the capture time as epoch milliseconds under
/// `last_price_ts`, two separate keys.
pub struct LastKnownPriceCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl LastKnownPriceCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn price_key(currency: &str) -> String {
        format!("{}{}", LAST_PRICE_KEY_PREFIX, currency)
    }

    /// Read the last stored price for `currency`, regardless of age.
    pub fn get(&self, currency: &str) -> Result<Option<CachedPrice>> {
        let Some(raw) = self.store.get(&Self::price_key(currency))? else {
            return Ok(None);
        };

        let value = match Decimal::from_str(raw.trim()) {
            Ok(value) if value > Decimal::ZERO => value,
            _ => {
                warn!("Ignoring unreadable cached price for '{}': {:?}", currency, raw);
                return Ok(None);
            }
        };

        let captured_at = self
            .store
            .get(LAST_PRICE_TS_KEY)?
            .and_then(|ts| ts.trim().parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Ok(Some(CachedPrice { value, captured_at }))
    }

    /// Store `value` as the last known price for `currency`, stamped now.
    pub fn put(&self, currency: &str, value: Decimal) -> Result<DateTime<Utc>> {
        let now = self.clock.now();
        self.store
            .set(&Self::price_key(currency), &value.normalize().to_string())?;
        self.store
            .set(LAST_PRICE_TS_KEY, &now.timestamp_millis().to_string())?;
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::kv::MemoryKeyValueStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn setup() -> (Arc<MemoryKeyValueStore>, Arc<ManualClock>, LastKnownPriceCache) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap(),
        ));
        let cache = LastKnownPriceCache::new(store.clone(), clock.clone());
        (store, clock, cache)
    }

    #[test]
    fn test_empty_cache_reads_none() {
        let (_, _, cache) = setup();
        assert_eq!(cache.get("usd").unwrap(), None);
    }

    #[test]
    fn test_put_writes_both_keys() {
        let (store, clock, cache) = setup();
        cache.put("usd", dec!(64250.10)).unwrap();

        assert_eq!(store.get("last_price_usd").unwrap().as_deref(), Some("64250.1"));
        assert_eq!(
            store.get("last_price_ts").unwrap(),
            Some(clock.now().timestamp_millis().to_string())
        );
    }

    #[test]
    fn test_never_expires() {
        let (_, clock, cache) = setup();
        let stored_at = cache.put("usd", dec!(64000)).unwrap();
        clock.advance(Duration::days(30));

        let cached = cache.get("usd").unwrap().unwrap();
        assert_eq!(cached.value, dec!(64000));
        assert_eq!(cached.captured_at, Some(stored_at));
    }

    #[test]
    fn test_corrupt_value_reads_none() {
        let (store, _, cache) = setup();
        store.set("last_price_usd", "NaN").unwrap();
        assert_eq!(cache.get("usd").unwrap(), None);
    }

    #[test]
    fn test_missing_timestamp_is_tolerated() {
        let (store, _, cache) = setup();
        store.set("last_price_usd", "61000.5").unwrap();

        let cached = cache.get("usd").unwrap().unwrap();
        assert_eq!(cached.value, dec!(61000.5));
        assert_eq!(cached.captured_at, None);
    }
}
