//! Chain-tip height resolver.
//!
//! Uses the same attempt loop and first-success combinator as the price
//! resolver, over [`BlockHeightProvider`] sources in registration order.

use std::sync::Arc;

use futures::FutureExt;
use log::{info, warn};

use super::attempt::{attempt_provider, first_success, ProviderOutcome};
use super::policy::{FallbackStrategy, RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT};
use crate::errors::PriceError;
use crate::models::BlockHeight;
use crate::provider::BlockHeightProvider;

/// Target name reported in [`PriceError::AllSourcesUnavailable`].
pub const BLOCK_HEIGHT_TARGET: &str = "block_height";

pub struct ChainHeightResolver {
    sources: Vec<Arc<dyn BlockHeightProvider>>,
    policy: RetryPolicy,
    strategy: FallbackStrategy,
}

impl ChainHeightResolver {
    /// One attempt per source, 4000 ms each, sequential.
    pub fn new(sources: Vec<Arc<dyn BlockHeightProvider>>) -> Self {
        Self::with_config(
            sources,
            RetryPolicy::new(1, DEFAULT_ATTEMPT_TIMEOUT),
            FallbackStrategy::Sequential,
        )
    }

    pub fn with_config(
        sources: Vec<Arc<dyn BlockHeightProvider>>,
        policy: RetryPolicy,
        strategy: FallbackStrategy,
    ) -> Self {
        Self {
            sources,
            policy,
            strategy,
        }
    }

    /// Resolve the current chain tip height.
    pub async fn resolve(&self) -> Result<BlockHeight, PriceError> {
        let outcomes: Vec<ProviderOutcome<'_, BlockHeight>> = self
            .sources
            .iter()
            .map(|source| {
                let policy = &self.policy;
                async move {
                    attempt_provider(source.id(), policy, move || source.fetch_height()).await
                }
                .boxed()
            })
            .collect();

        match first_success(self.strategy, outcomes).await {
            Ok(height) => {
                info!("Chain tip at {} from '{}'", height.height, height.source);
                Ok(height)
            }
            Err(attempts) => {
                warn!("All chain sources failed after {} attempts", attempts.len());
                Err(PriceError::AllSourcesUnavailable {
                    target: BLOCK_HEIGHT_TARGET.to_string(),
                    attempts,
                })
            }
        }
    }

    pub fn sources(&self) -> &[Arc<dyn BlockHeightProvider>] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockSource {
        id: &'static str,
        height: Option<u64>,
        hang: bool,
        call_count: AtomicUsize,
    }

    impl MockSource {
        fn ok(id: &'static str, height: u64) -> Arc<Self> {
            Arc::new(Self {
                id,
                height: Some(height),
                hang: false,
                call_count: AtomicUsize::new(0),
            })
        }

        fn failing(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                height: None,
                hang: false,
                call_count: AtomicUsize::new(0),
            })
        }

        fn hanging(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                height: None,
                hang: true,
                call_count: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BlockHeightProvider for MockSource {
        fn id(&self) -> &'static str {
            self.id
        }

        async fn fetch_height(&self) -> Result<BlockHeight, PriceError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            match self.height {
                Some(height) => Ok(BlockHeight {
                    height,
                    source: self.id.to_string(),
                    observed_at: Utc::now(),
                }),
                None => Err(PriceError::HttpStatus {
                    provider: self.id.to_string(),
                    status: 503,
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_second_source() {
        let first = MockSource::failing("FIRST");
        let second = MockSource::ok("SECOND", 840_000);
        let sources: Vec<Arc<dyn BlockHeightProvider>> = vec![first.clone(), second.clone()];
        let resolver = ChainHeightResolver::new(sources);

        let height = resolver.resolve().await.unwrap();
        assert_eq!(height.height, 840_000);
        assert_eq!(height.source, "SECOND");
        assert_eq!(first.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_source_times_out() {
        let slow = MockSource::hanging("SLOW");
        let fast = MockSource::ok("FAST", 850_123);
        let sources: Vec<Arc<dyn BlockHeightProvider>> = vec![slow, fast];
        let resolver = ChainHeightResolver::new(sources);

        let height = resolver.resolve().await.unwrap();
        assert_eq!(height.source, "FAST");
    }

    #[tokio::test]
    async fn test_all_sources_fail() {
        let sources: Vec<Arc<dyn BlockHeightProvider>> =
            vec![MockSource::failing("A"), MockSource::failing("B")];
        let resolver = ChainHeightResolver::new(sources);

        let err = resolver.resolve().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllSourcesUnavailable);
        assert_eq!(err.attempts().len(), 2);
        assert!(err.to_string().contains("block_height"));
    }
}
