//! Retry logic with full-jitter exponential backoff for transient failures.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::NetatmoResult;

/// Configuration for retry behavior.
///
/// A logical call is re-attempted while its failures stay retryable and both
/// budgets have room: the attempt count and the total elapsed time. Whichever
/// budget runs out first ends the call with the most recent failure.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Maximum total time across attempts and backoff sleeps
    pub max_elapsed: Duration,
    /// Base delay of the exponential backoff curve
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            max_elapsed: Duration::from_secs(300),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a retry configuration with the default budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt budget, including the first attempt.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the elapsed-time budget.
    pub fn max_elapsed(mut self, limit: Duration) -> Self {
        self.max_elapsed = limit;
        self
    }

    /// Set the base delay of the backoff curve.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the cap on any single backoff delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Ceiling of the backoff window after a given attempt: the exponential
    /// curve `base * 2^(attempt - 1)`, capped at [`RetryConfig::max_delay`].
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponential =
            self.base_delay.as_secs_f64() * 2f64.powi(attempt.saturating_sub(1) as i32);
        Duration::from_secs_f64(exponential.min(self.max_delay.as_secs_f64()))
    }

    /// Sample the delay to sleep after a given attempt.
    ///
    /// Full jitter: uniform over `[0, backoff_ceiling(attempt)]`, so callers
    /// retrying after a shared outage spread out instead of stampeding.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt).as_secs_f64();
        Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..=ceiling))
    }
}

/// Execute an operation with retry on transient failures.
///
/// The operation is invoked to produce a fresh future per attempt. Terminal
/// failures (see [`NetatmoError::is_retryable`]) surface immediately; when a
/// budget is exhausted the last failure is returned unchanged, so the caller
/// sees the classification of the final attempt.
///
/// [`NetatmoError::is_retryable`]: crate::errors::NetatmoError::is_retryable
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: F) -> NetatmoResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = NetatmoResult<T>>,
{
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) => {
                if !error.is_retryable() {
                    debug!(attempt, error = %error, "Terminal failure, not retrying");
                    return Err(error);
                }

                if attempt >= config.max_attempts || started.elapsed() >= config.max_elapsed {
                    warn!(
                        attempt,
                        max_attempts = config.max_attempts,
                        elapsed_ms = started.elapsed().as_millis(),
                        error = %error,
                        "Retry budget exhausted"
                    );
                    return Err(error);
                }

                let delay = config.delay_for_attempt(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "Retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
