//! Exponential backoff for page navigation.
//!
//! Transient failures (see [`HarvestError::is_retriable`]) are retried after
//! `base * 2^attempt` milliseconds. Anything else is returned on the first
//! attempt without sleeping.

use std::future::Future;
use std::time::Duration;

use crate::error::HarvestError;

/// Delay before retry number `attempt + 1`, i.e. `base_ms * 2^attempt`.
///
/// Saturates instead of overflowing on extreme configs.
#[must_use]
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(1u64 << attempt.min(62)))
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The operation runs at most `max_retries + 1` times. When every attempt
/// fails the last error is returned to the caller.
///
/// # Backoff schedule (example with `backoff_base_ms = 2000`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | — |
/// | 1 (first retry) | 2000 × 2^0 = 2 s |
/// | 2 (second retry) | 2000 × 2^1 = 4 s |
/// | 3 (third retry) | 2000 × 2^2 = 8 s |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HarvestError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retriable() || attempt >= max_retries {
            if attempt > 0 {
                tracing::warn!(
                    attempts = attempt + 1,
                    error = %err,
                    "giving up after retries"
                );
            }
            return Err(err);
        }

        let delay = backoff_delay(backoff_base_ms, attempt);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient navigation error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
