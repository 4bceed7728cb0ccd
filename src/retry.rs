//! Bounded-timeout upstream calls with linear backoff between attempts.
//!
//! Each attempt is raced against its deadline with [`tokio::time::timeout`].
//! On expiry the attempt's future is dropped, so a late response can never
//! be observed by the caller.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::UpstreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    /// Delay before attempt `n + 1` is `backoff_step * n`.
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// One attempt, no backoff.
    pub fn single(timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            timeout,
            backoff_step: Duration::ZERO,
        }
    }

    /// Up to `max_attempts` tries with a one-second linear backoff step.
    pub fn linear(max_attempts: u32, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout,
            backoff_step: Duration::from_millis(1000),
        }
    }

    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Runs `attempt` until it succeeds or the policy is exhausted, returning
/// the last error in the latter case.
pub async fn with_retries<T, F, Fut>(
    api: &'static str,
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let timeout_ms = u64::try_from(policy.timeout.as_millis()).unwrap_or(u64::MAX);
    let mut last_error = None;

    for n in 1..=policy.max_attempts.max(1) {
        debug!(api, attempt = n, max = policy.max_attempts, "upstream attempt");

        let outcome = match tokio::time::timeout(policy.timeout, attempt()).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout { api, timeout_ms }),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) => {
                if n < policy.max_attempts {
                    warn!(api, attempt = n, error = %e, "upstream attempt failed, retrying");
                    tokio::time::sleep(policy.backoff_after(n)).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(UpstreamError::Network {
        api,
        reason: "no attempts made".to_string(),
    }))
}
