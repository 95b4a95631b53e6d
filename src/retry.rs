// src/retry.rs
//! Exponential backoff for rate-limited provider calls.
//!
//! Only errors that report themselves as rate limits are retried. The delay
//! doubles after every retry; there is no jitter and no upper bound.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::warn;

use crate::error::ProviderError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(2_000);

/// Errors that can tell whether another attempt is worthwhile.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        self.is_rate_limited()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Delays slept before each retry, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let first = self.initial_delay;
        (0..self.max_retries).map(move |i| first.saturating_mul(2u32.saturating_pow(i)))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent. The last error is returned as-is.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut retries_left = policy.max_retries;
    let mut delay = policy.initial_delay;

    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if retries_left > 0 && e.is_retryable() => {
                warn!(
                    target: "monitor",
                    delay_ms = delay.as_millis() as u64,
                    retries_left,
                    error = %e,
                    "rate limit hit, backing off"
                );
                counter!("provider_retries_total").increment(1);
                tokio::time::sleep(delay).await;
                retries_left -= 1;
                delay = delay.saturating_mul(2);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_double() {
        let d: Vec<u64> = RetryPolicy::default()
            .delays()
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(d, vec![2_000, 4_000, 8_000]);
    }

    #[test]
    fn zero_retries_means_no_delays() {
        assert_eq!(RetryPolicy::new(0, DEFAULT_INITIAL_DELAY).delays().count(), 0);
    }
}
