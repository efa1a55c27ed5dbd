//! The per-provider attempt loop and the first-success combinator shared by
//! the price and chain-height resolvers.

use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};

use super::policy::{FallbackStrategy, RetryPolicy};
use crate::errors::{ErrorKind, PriceError, ProviderAttempt};

/// Outcome of one provider's attempt loop: a value, or every failed attempt.
pub(crate) type ProviderOutcome<'a, T> = BoxFuture<'a, Result<T, Vec<ProviderAttempt>>>;

/// Try one provider up to `policy.attempts_per_provider` times.
///
/// Each call is bounded by `policy.attempt_timeout`. When the bound elapses
/// the call's future is dropped, which cancels the in-flight request.
/// An `Unsupported` error ends the loop early since repeating it cannot help.
pub(crate) async fn attempt_provider<T, F, Fut>(
    provider: &str,
    policy: &RetryPolicy,
    mut call: F,
) -> Result<T, Vec<ProviderAttempt>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PriceError>>,
{
    let mut failures = Vec::new();

    for attempt in 1..=policy.attempts_per_provider {
        let error = match tokio::time::timeout(policy.attempt_timeout, call()).await {
            Ok(Ok(value)) => {
                debug!("Provider '{}' succeeded on attempt {}", provider, attempt);
                return Ok(value);
            }
            Ok(Err(e)) => e,
            Err(_) => PriceError::Timeout {
                provider: provider.to_string(),
                after: policy.attempt_timeout,
            },
        };

        warn!(
            "Price attempt failed: provider '{}' attempt {}/{}: {}",
            provider, attempt, policy.attempts_per_provider, error
        );
        let give_up = error.kind() == ErrorKind::Unsupported;
        failures.push(ProviderAttempt {
            provider: provider.to_string(),
            attempt,
            error: error.to_string(),
        });
        if give_up {
            break;
        }
    }

    Err(failures)
}

/// Drive per-provider loops until one yields a value.
///
/// `outcomes` must be in priority order. The futures are lazy, so in
/// sequential mode a provider is not contacted before the previous one has
/// given up. In race mode they are polled together and the losers are
/// dropped when this function returns.
pub(crate) async fn first_success<T>(
    strategy: FallbackStrategy,
    outcomes: Vec<ProviderOutcome<'_, T>>,
) -> Result<T, Vec<ProviderAttempt>> {
    let mut failures = Vec::new();

    match strategy {
        FallbackStrategy::Sequential => {
            for outcome in outcomes {
                match outcome.await {
                    Ok(value) => return Ok(value),
                    Err(mut attempts) => failures.append(&mut attempts),
                }
            }
        }
        FallbackStrategy::Race => {
            let mut pending: FuturesUnordered<_> = outcomes.into_iter().collect();
            while let Some(outcome) = pending.next().await {
                match outcome {
                    Ok(value) => return Ok(value),
                    Err(mut attempts) => failures.append(&mut attempts),
                }
            }
        }
    }

    Err(failures)
}
