use std::sync::Arc;

use async_trait::async_trait;
use log::error;

use satoshi_market_data::ChainHeightResolver;

use super::halving_model::{HalvingSnapshot, HalvingStatus};
use crate::clock::Clock;

/// Trait defining the contract for halving data refreshes.
#[async_trait]
pub trait HalvingServiceTrait: Send + Sync {
    /// Resolve the chain tip and derive halving data. Never fails.
    async fn refresh(&self) -> HalvingStatus;
}

pub struct HalvingService {
    resolver: Arc<ChainHeightResolver>,
    clock: Arc<dyn Clock>,
}

impl HalvingService {
    pub fn new(resolver: Arc<ChainHeightResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }
}

#[async_trait]
impl HalvingServiceTrait for HalvingService {
    async fn refresh(&self) -> HalvingStatus {
        match self.resolver.resolve().await {
            Ok(tip) => match HalvingSnapshot::from_height(tip.height, self.clock.now()) {
                Some(snapshot) => HalvingStatus::Available {
                    snapshot: snapshot.with_source(tip.source),
                },
                None => {
                    error!("Block height {} from {} is out of range", tip.height, tip.source);
                    HalvingStatus::Unavailable {
                        reason: format!("block height {} is out of range", tip.height),
                    }
                }
            },
            Err(e) => {
                error!("Halving refresh failed: {}", e);
                HalvingStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_support::{height_resolver_for, MockHeightSource};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_refresh_available() {
        let source = MockHeightSource::new(&[Some(850_000)]);
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let service = HalvingService::new(
            height_resolver_for(&source),
            Arc::new(ManualClock::new(now)),
        );

        let status = service.refresh().await;
        let snapshot = status.snapshot().unwrap();
        assert_eq!(snapshot.blocks_remaining, 200_000);
        assert_eq!(snapshot.source, "MOCK_CHAIN");
    }

    #[tokio::test]
    async fn test_refresh_unavailable() {
        let source = MockHeightSource::new(&[None]);
        let service = HalvingService::new(
            height_resolver_for(&source),
            Arc::new(ManualClock::new(Utc::now())),
        );

        let status = service.refresh().await;
        assert!(matches!(status, HalvingStatus::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_refresh_out_of_range_height() {
        let source = MockHeightSource::new(&[Some(u64::MAX)]);
        let service = HalvingService::new(
            height_resolver_for(&source),
            Arc::new(ManualClock::new(Utc::now())),
        );

        let status = service.refresh().await;
        assert!(matches!(
            status,
            HalvingStatus::Unavailable { ref reason } if reason.contains("out of range")
        ));
    }
}
