//! Exponential-backoff retry wrapper, independent of the HTTP transport.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry configuration for upstream calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is one more.
    pub max_retries: u32,
    /// Exponential base; the wait before retry `n` is `unit * base^n`.
    pub backoff_base: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 3,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Same schedule shape with a different time unit.
    #[must_use]
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Delay before retry number `retry` (1-based): 3s, 9s, 27s by default.
    #[must_use]
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let factor = self.backoff_base.saturating_pow(retry);
        self.unit.saturating_mul(factor)
    }

    #[must_use]
    pub fn should_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Run `op` until it succeeds, fails with an error `is_transient` rejects,
    /// or the retry budget runs out. The last error is returned unchanged.
    pub async fn run<T, E, F, Fut, P>(&self, name: &str, is_transient: P, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && self.should_retry(retries) => {
                    retries += 1;
                    let delay = self.delay_for_attempt(retries);
                    warn!(
                        op = name,
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient upstream failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
