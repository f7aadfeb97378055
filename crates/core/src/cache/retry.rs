//! Retry policy for cache fetches.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::QueryKey;
use crate::Error;

/// Default delay before the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Default upper bound for a retry delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

type Backoff = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// How many times a failed fetch is retried and how long to wait in between.
///
/// `delay(n)` is the pause before retry `n` (0-based), so with the default
/// exponential policy the waits are 1s, 2s, 4s.
#[derive(Clone)]
pub struct RetryPolicy {
    pub retry_count: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// `min(base * 2^attempt, max)`.
    pub fn exponential(retry_count: u32, base: Duration, max: Duration) -> Self {
        Self::with_backoff(retry_count, move |attempt| {
            let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
            base.checked_mul(factor).unwrap_or(max).min(max)
        })
    }

    /// Retry with a caller-supplied backoff function.
    pub fn with_backoff(retry_count: u32, backoff: impl Fn(u32) -> Duration + Send + Sync + 'static) -> Self {
        Self { retry_count, backoff: Arc::new(backoff) }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::with_backoff(0, |_| Duration::ZERO)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }

    /// Run `op` until it succeeds or the retry budget is spent.
    ///
    /// Every attempt calls `op` afresh. Invalid input is returned at once.
    pub async fn run<T, F, Fut>(&self, key: &QueryKey, mut op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err @ Error::InvalidInput(_)) => return Err(err),
                Err(err) if attempt < self.retry_count => {
                    let delay = self.delay(attempt);
                    tracing::warn!(
                        %key,
                        attempt = attempt + 1,
                        retries = self.retry_count,
                        delay_ms = delay.as_millis() as u64,
                        "fetch failed, retrying: {}",
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if self.retry_count > 0 {
                        tracing::warn!(%key, retries = self.retry_count, "fetch failed after retries: {}", err);
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(3, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("retry_count", &self.retry_count)
            .field("first_delay", &self.delay(0))
            .finish_non_exhaustive()
    }
}
