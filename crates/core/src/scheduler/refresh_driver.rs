use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::{Scheduler, TaskHandle};
use crate::constants::{CHAIN_REFRESH_INTERVAL, PRICE_REFRESH_INTERVAL};
use crate::events::{DashboardEvent, DashboardSink};
use crate::halving::HalvingServiceTrait;
use crate::prices::{HeadlinePriceServiceTrait, PriceStatus};

/// Periods of the two independent refresh timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntervals {
    pub price: Duration,
    pub chain: Duration,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            price: PRICE_REFRESH_INTERVAL,
            chain: CHAIN_REFRESH_INTERVAL,
        }
    }
}

/// Keeps the headline price and halving data current for the display.
///
/// Both timers stop when the driver is stopped or dropped.
pub struct RefreshDriver {
    scheduler: Scheduler,
    tasks: Vec<TaskHandle>,
}

impl RefreshDriver {
    /// Emits the cached headline price (if any), then starts both timers.
    pub fn start(
        headline: Arc<dyn HeadlinePriceServiceTrait>,
        halving: Arc<dyn HalvingServiceTrait>,
        sink: Arc<dyn DashboardSink>,
        intervals: RefreshIntervals,
    ) -> Self {
        match headline.cached() {
            Ok(Some(status)) => sink.emit(DashboardEvent::price_updated(status)),
            Ok(None) => debug!("No cached headline price to show at startup"),
            Err(e) => warn!("Failed to read cached headline price: {}", e),
        }

        let scheduler = Scheduler::new();

        let price_sink = sink.clone();
        let price_task = scheduler.spawn_periodic("price", intervals.price, move || {
            let headline = headline.clone();
            let sink = price_sink.clone();
            async move {
                let status = headline.refresh().await;
                if let PriceStatus::Unavailable { currency } = &status {
                    debug!("Headline price for '{}' unavailable this tick", currency);
                }
                sink.emit(DashboardEvent::price_updated(status));
            }
        });

        let chain_task = scheduler.spawn_periodic("chain", intervals.chain, move || {
            let halving = halving.clone();
            let sink = sink.clone();
            async move {
                let status = halving.refresh().await;
                sink.emit(DashboardEvent::halving_updated(status));
            }
        });

        Self {
            scheduler,
            tasks: vec![price_task, chain_task],
        }
    }

    /// Number of refresh timers still running.
    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    pub fn stop(&mut self) {
        for task in &self.tasks {
            task.cancel();
        }
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MockDashboardSink;
    use crate::halving::{HalvingSnapshot, HalvingStatus};
    use crate::{Error, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    struct FakeHeadline {
        cached: Option<PriceStatus>,
        refreshes: AtomicUsize,
    }

    impl FakeHeadline {
        fn new(cached: Option<PriceStatus>) -> Arc<Self> {
            Arc::new(Self {
                cached,
                refreshes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HeadlinePriceServiceTrait for FakeHeadline {
        fn cached(&self) -> Result<Option<PriceStatus>> {
            Ok(self.cached.clone())
        }

        async fn refresh(&self) -> PriceStatus {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            PriceStatus::Unavailable {
                currency: "usd".to_string(),
            }
        }
    }

    struct BrokenCacheHeadline;

    #[async_trait]
    impl HeadlinePriceServiceTrait for BrokenCacheHeadline {
        fn cached(&self) -> Result<Option<PriceStatus>> {
            Err(Error::Storage("disk gone".to_string()))
        }

        async fn refresh(&self) -> PriceStatus {
            PriceStatus::Unavailable {
                currency: "usd".to_string(),
            }
        }
    }

    struct FakeHalving {
        refreshes: AtomicUsize,
    }

    impl FakeHalving {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                refreshes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HalvingServiceTrait for FakeHalving {
        async fn refresh(&self) -> HalvingStatus {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            HalvingStatus::Available {
                snapshot: HalvingSnapshot::from_height(840_000, Utc::now()).unwrap(),
            }
        }
    }

    fn count<F: Fn(&DashboardEvent) -> bool>(sink: &MockDashboardSink, f: F) -> usize {
        sink.events().iter().filter(|e| f(e)).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_timers_with_independent_periods() {
        let headline = FakeHeadline::new(None);
        let halving = FakeHalving::new();
        let sink = MockDashboardSink::new();

        let _driver = RefreshDriver::start(
            headline.clone(),
            halving.clone(),
            Arc::new(sink.clone()),
            RefreshIntervals::default(),
        );

        sleep(Duration::from_millis(10)).await;
        assert_eq!(headline.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(halving.refreshes.load(Ordering::SeqCst), 1);

        // t = 60.01 s: price ticks at 0, 5, ..., 60; chain at 0 and 60.
        sleep(Duration::from_secs(60)).await;
        assert_eq!(headline.refreshes.load(Ordering::SeqCst), 13);
        assert_eq!(halving.refreshes.load(Ordering::SeqCst), 2);

        assert_eq!(
            count(&sink, |e| matches!(e, DashboardEvent::PriceUpdated(_))),
            13
        );
        assert_eq!(
            count(&sink, |e| matches!(e, DashboardEvent::HalvingUpdated(_))),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_price_emitted_first() {
        let cached = PriceStatus::LastKnown {
            currency: "usd".to_string(),
            value: dec!(64000),
            captured_at: None,
        };
        let headline = FakeHeadline::new(Some(cached.clone()));
        let sink = MockDashboardSink::new();

        let _driver = RefreshDriver::start(
            headline,
            FakeHalving::new(),
            Arc::new(sink.clone()),
            RefreshIntervals::default(),
        );

        let events = sink.events();
        assert_eq!(events[0], DashboardEvent::price_updated(cached));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_cache_does_not_block_start() {
        let sink = MockDashboardSink::new();
        let driver = RefreshDriver::start(
            Arc::new(BrokenCacheHeadline),
            FakeHalving::new(),
            Arc::new(sink.clone()),
            RefreshIntervals::default(),
        );

        sleep(Duration::from_millis(10)).await;
        assert_eq!(driver.active_tasks(), 2);
        assert_eq!(
            count(&sink, |e| matches!(e, DashboardEvent::PriceUpdated(_))),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_and_drop_end_refreshes() {
        let headline = FakeHeadline::new(None);
        let halving = FakeHalving::new();

        let mut driver = RefreshDriver::start(
            headline.clone(),
            halving.clone(),
            Arc::new(MockDashboardSink::new()),
            RefreshIntervals::default(),
        );
        sleep(Duration::from_millis(10)).await;
        driver.stop();
        sleep(Duration::from_secs(120)).await;

        assert_eq!(driver.active_tasks(), 0);
        assert_eq!(headline.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(halving.refreshes.load(Ordering::SeqCst), 1);

        let other = FakeHeadline::new(None);
        let driver = RefreshDriver::start(
            other.clone(),
            FakeHalving::new(),
            Arc::new(MockDashboardSink::new()),
            RefreshIntervals {
                price: Duration::from_secs(1),
                chain: Duration::from_secs(1),
            },
        );
        sleep(Duration::from_millis(10)).await;
        drop(driver);
        sleep(Duration::from_secs(10)).await;
        assert_eq!(other.refreshes.load(Ordering::SeqCst), 1);
    }
}
