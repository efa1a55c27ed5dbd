use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::constants::{RATES_CACHE_KEY, RATES_TTL};
use crate::errors::Result;
use crate::kv::KeyValueStore;

/// Persisted layout: `{ "t": <epoch-ms>, "rates": { "<cur>": <number> } }`.
#[derive(Serialize, Deserialize)]
struct StoredRates {
    t: i64,
    rates: BTreeMap<String, Decimal>,
}

/// A decoded rates blob.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub captured_at: DateTime<Utc>,
    /// Lowercase currency code -> BTC rate. All values are positive.
    pub rates: BTreeMap<String, Decimal>,
}

impl CacheEntry {
    /// Whether the entry is younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.captured_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age < ttl,
            Err(_) => true,
        }
    }

    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }
}

/// Multi-currency rates cache with a freshness window.
///
/// The whole rate set lives in one serialized blob and is replaced on every
/// `put`, so a reader sees either the previous set or the new one.
pub struct RatesCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl RatesCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(store, clock, RATES_TTL)
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Decode the stored blob. A corrupt blob reads as absent.
    pub fn entry(&self) -> Result<Option<CacheEntry>> {
        let Some(raw) = self.store.get(RATES_CACHE_KEY)? else {
            return Ok(None);
        };

        let stored: StoredRates = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring corrupt rates cache: {}", e);
                return Ok(None);
            }
        };
        let Some(captured_at) = Utc.timestamp_millis_opt(stored.t).single() else {
            warn!("Ignoring rates cache with invalid timestamp {}", stored.t);
            return Ok(None);
        };

        let rates = stored
            .rates
            .into_iter()
            .filter(|(_, rate)| *rate > Decimal::ZERO)
            .collect();
        Ok(Some(CacheEntry { captured_at, rates }))
    }

    /// Rate for `currency` if the entry is within the freshness window.
    pub fn get(&self, currency: &str) -> Result<Option<Decimal>> {
        let now = self.clock.now();
        Ok(self
            .entry()?
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .and_then(|entry| entry.rate(currency)))
    }

    /// Rate for `currency` regardless of age.
    pub fn get_stale_if_present(&self, currency: &str) -> Result<Option<Decimal>> {
        Ok(self.entry()?.and_then(|entry| entry.rate(currency)))
    }

    /// Replace the stored rate set wholesale and stamp it now.
    ///
    /// Codes are lowercased; non-positive rates are dropped.
    pub fn put(&self, rates: &BTreeMap<String, Decimal>) -> Result<CacheEntry> {
        let captured_at = self.clock.now();
        let rates: BTreeMap<String, Decimal> = rates
            .iter()
            .filter(|(_, rate)| **rate > Decimal::ZERO)
            .map(|(code, rate)| (code.trim().to_ascii_lowercase(), *rate))
            .collect();

        let blob = serde_json::to_string(&StoredRates {
            t: captured_at.timestamp_millis(),
            rates: rates.clone(),
        })?;
        self.store.set(RATES_CACHE_KEY, &blob)?;
        debug!("Stored {} rates in cache", rates.len());

        Ok(CacheEntry { captured_at, rates })
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(RATES_CACHE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::kv::MemoryKeyValueStore;
    use chrono::Duration as ChronoDuration;
    use rust_decimal_macros::dec;

    fn setup() -> (Arc<MemoryKeyValueStore>, Arc<ManualClock>, RatesCache) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap(),
        ));
        let cache = RatesCache::new(store.clone(), clock.clone());
        (store, clock, cache)
    }

    fn rates(pairs: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    #[test]
    fn test_put_then_get_within_ttl() {
        let (_, clock, cache) = setup();
        cache
            .put(&rates(&[("usd", dec!(64000.5)), ("eur", dec!(59000.25))]))
            .unwrap();
        clock.advance(ChronoDuration::seconds(59));

        assert_eq!(cache.get("usd").unwrap(), Some(dec!(64000.5)));
        assert_eq!(cache.get("eur").unwrap(), Some(dec!(59000.25)));
        assert_eq!(cache.get("jpy").unwrap(), None);
    }

    #[test]
    fn test_expired_entry_is_stale_only() {
        let (_, clock, cache) = setup();
        cache.put(&rates(&[("usd", dec!(64000))])).unwrap();
        clock.advance(ChronoDuration::seconds(60));

        assert_eq!(cache.get("usd").unwrap(), None);
        assert_eq!(cache.get_stale_if_present("usd").unwrap(), Some(dec!(64000)));
    }

    #[test]
    fn test_put_replaces_whole_set() {
        let (_, _, cache) = setup();
        cache
            .put(&rates(&[("usd", dec!(64000)), ("eur", dec!(59000))]))
            .unwrap();
        cache.put(&rates(&[("usd", dec!(65000))])).unwrap();

        assert_eq!(cache.get("usd").unwrap(), Some(dec!(65000)));
        assert_eq!(cache.get_stale_if_present("eur").unwrap(), None);
    }

    #[test]
    fn test_blob_layout() {
        let (store, clock, cache) = setup();
        cache.put(&rates(&[("USD", dec!(64000.5))])).unwrap();

        let raw = store.get("btc_px_converter").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["t"].as_i64(), Some(clock.now().timestamp_millis()));
        assert_eq!(value["rates"]["usd"].as_f64(), Some(64000.5));
    }

    #[test]
    fn test_reads_blob_written_elsewhere() {
        let (store, clock, cache) = setup();
        let t = clock.now().timestamp_millis() - 10_000;
        store
            .set(
                "btc_px_converter",
                &format!(r#"{{"t":{},"rates":{{"usd":63999.12,"eur":0}}}}"#, t),
            )
            .unwrap();

        assert_eq!(cache.get("usd").unwrap(), Some(dec!(63999.12)));
        assert_eq!(cache.get("eur").unwrap(), None);
    }

    #[test]
    fn test_corrupt_blob_reads_absent() {
        let (store, _, cache) = setup();
        store.set("btc_px_converter", "{not json").unwrap();

        assert_eq!(cache.entry().unwrap(), None);
        assert_eq!(cache.get_stale_if_present("usd").unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let (_, _, cache) = setup();
        cache.put(&rates(&[("usd", dec!(64000))])).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.entry().unwrap(), None);
    }
}
