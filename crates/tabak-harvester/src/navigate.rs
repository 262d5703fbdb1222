use tabak_core::ScrapeConfig;

use crate::error::HarvestError;
use crate::retry::retry_with_backoff;
use crate::session::PageSession;

/// Points `session` at `url`, retrying transient failures up to
/// `config.max_retries` additional times with exponential backoff.
///
/// # Errors
///
/// Returns the last navigation error once retries are exhausted, or the first
/// non-retriable one (e.g. [`HarvestError::NotFound`]) immediately.
pub async fn navigate<S>(session: &S, url: &str, config: &ScrapeConfig) -> Result<(), HarvestError>
where
    S: PageSession + ?Sized,
{
    let timeout = config.timeout();
    retry_with_backoff(config.max_retries, config.retry_backoff_base_ms, move || {
        session.goto(url, timeout)
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// Fails the first `failures` navigations, then succeeds.
    struct FlakySession {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PageSession for FlakySession {
        async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), HarvestError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(HarvestError::Navigation {
                    url: url.to_owned(),
                    reason: "net::ERR_TIMED_OUT".to_owned(),
                })
            } else {
                Ok(())
            }
        }

        async fn content(&self) -> Result<String, HarvestError> {
            Ok(String::new())
        }

        async fn scroll_to_bottom(&self) -> Result<(), HarvestError> {
            Ok(())
        }

        async fn current_url(&self) -> Option<String> {
            None
        }
    }

    fn config(max_retries: u32) -> ScrapeConfig {
        ScrapeConfig {
            max_retries,
            retry_backoff_base_ms: 2000,
            ..ScrapeConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn third_attempt_succeeds_after_two_backoffs() {
        let session = FlakySession {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let started = tokio::time::Instant::now();
        navigate(&session, "https://htreviews.org/tobaccos/brands", &config(3))
            .await
            .unwrap();
        assert_eq!(session.calls.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(6000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(6100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_the_failure() {
        let session = FlakySession {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let err = navigate(&session, "https://htreviews.org/tobaccos/brands", &config(2))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::Navigation { .. }));
        assert_eq!(session.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let session = FlakySession {
            failures: 1,
            calls: AtomicU32::new(0),
        };
        let result = navigate(&session, "https://htreviews.org/", &config(0)).await;
        assert!(result.is_err());
        assert_eq!(session.calls.load(Ordering::SeqCst), 1);
    }
}
