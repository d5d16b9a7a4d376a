//! Opt-in retries for callers. [`crate::ApiClient`] never retries on its own;
//! wrap a call in [`retry_with_backoff`] where repeating it is safe.

use crate::error::{ApiError, Result};
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;
use tracing::warn;

/// Exponential backoff schedule for [`retry_with_backoff`].
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// The schedule never expires on its own; `max_attempts` bounds it.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(0.1)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is reached. A 429 waits at least its `Retry-After`.
pub async fn retry_with_backoff<F, Fut, T>(config: &RetryConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = config.backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let wait = match backoff.next_backoff() {
            Some(interval) if err.is_retryable() && attempt < config.max_attempts => {
                interval.max(retry_after(&err))
            }
            _ => return Err(err),
        };

        warn!(error = %err, attempt, wait_ms = wait.as_millis(), "Retrying Zendesk call");
        tokio::time::sleep(wait).await;
    }
}

fn retry_after(err: &ApiError) -> Duration {
    match err {
        ApiError::Client {
            retry_after: Some(secs),
            ..
        } => Duration::from_secs(*secs),
        _ => Duration::ZERO,
    }
}
