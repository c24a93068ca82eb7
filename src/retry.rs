/*!
 * Centralized retry handling with exponential backoff.
 *
 * Every call site that talks to a provider goes through `RetryPolicy`
 * instead of rolling its own loop. The backoff doubles after each failed
 * attempt: the wait before attempt k (k >= 2) is `backoff_base_ms * 2^(k-2)`.
 */

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::errors::ProviderError;

/// Retry policy shared by provider call sites.
///
/// Stateless: a single instance can drive any number of concurrent
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    max_attempts: u32,

    /// Base backoff in milliseconds, doubled on each retry
    backoff_base_ms: u64,
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and base backoff
    pub fn new(max_attempts: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base_ms,
        }
    }

    /// Policy that runs the operation exactly once
    pub fn no_retry() -> Self {
        Self::new(1, 0)
    }

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run an operation until it succeeds or the attempt budget is spent.
    ///
    /// The last error is propagated unchanged; no delay is added after the
    /// final failure.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.max_attempts {
                        return Err(error);
                    }

                    let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                    warn!(
                        "{} failed (attempt {}/{}): {} - retrying in {}ms",
                        label, attempt, self.max_attempts, error, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Like [`run`](Self::run), but stops early on provider errors a retry
    /// cannot fix (auth failures, 4xx responses, unavailable videos).
    pub async fn run_provider<T, F, Fut>(
        &self,
        label: &str,
        mut operation: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_retryable() || attempt >= self.max_attempts {
                        return Err(error);
                    }

                    let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                    warn!(
                        "{} failed (attempt {}/{}): {} - retrying in {}ms",
                        label, attempt, self.max_attempts, error, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000)
    }
}
