//! Best-effort wait for client-side rendering to finish.

use std::time::Duration;

use tokio::time::Instant;

use crate::session::PageSession;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Consecutive polls with an unchanged, non-empty DOM before the page is
/// treated as rendered.
const STABLE_POLLS: u32 = 2;

/// Blocks for up to `max_wait` while the rendered DOM keeps changing.
///
/// Never fails: a page that is still loading when the budget runs out is
/// scraped with whatever is present. Read errors are logged and polling
/// continues until the deadline.
pub async fn await_rendered_content<S>(session: &S, max_wait: Duration)
where
    S: PageSession + ?Sized,
{
    let deadline = Instant::now() + max_wait;
    let mut last_len: Option<usize> = None;
    let mut stable = 0u32;

    loop {
        match session.content().await {
            Ok(html) => {
                let len = html.len();
                if len > 0 && last_len == Some(len) {
                    stable += 1;
                    if stable >= STABLE_POLLS {
                        tracing::debug!(bytes = len, "page content settled");
                        return;
                    }
                } else {
                    stable = 0;
                }
                last_len = Some(len);
            }
            Err(e) => {
                tracing::debug!(error = %e, "content not readable yet");
            }
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::info!(
                max_wait_ms = u64::try_from(max_wait.as_millis()).unwrap_or(u64::MAX),
                "readiness wait elapsed; scraping current content"
            );
            return;
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::HarvestError;

    /// Returns a DOM that grows by one element for the first `growth_polls`
    /// reads, then stays the same.
    struct GrowingSession {
        growth_polls: usize,
        reads: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PageSession for GrowingSession {
        async fn goto(&self, _url: &str, _timeout: Duration) -> Result<(), HarvestError> {
            Ok(())
        }

        async fn content(&self) -> Result<String, HarvestError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HarvestError::Session {
                    operation: "content",
                    reason: "detached".to_owned(),
                });
            }
            Ok("<li></li>".repeat(n.min(self.growth_polls) + 1))
        }

        async fn scroll_to_bottom(&self) -> Result<(), HarvestError> {
            Ok(())
        }

        async fn current_url(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_once_content_stops_changing() {
        let session = GrowingSession {
            growth_polls: 3,
            reads: AtomicUsize::new(0),
            fail: false,
        };
        let started = Instant::now();
        await_rendered_content(&session, Duration::from_secs(10)).await;
        // 4 growing reads, then 2 identical ones.
        assert_eq!(session.reads.load(Ordering::SeqCst), 6);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_at_the_deadline_without_failing() {
        let session = GrowingSession {
            growth_polls: usize::MAX,
            reads: AtomicUsize::new(0),
            fail: false,
        };
        let started = Instant::now();
        await_rendered_content(&session, Duration::from_millis(1000)).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1300), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn read_errors_are_tolerated() {
        let session = GrowingSession {
            growth_polls: 0,
            reads: AtomicUsize::new(0),
            fail: true,
        };
        await_rendered_content(&session, Duration::from_millis(500)).await;
        assert!(session.reads.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn zero_budget_reads_once() {
        let session = GrowingSession {
            growth_polls: usize::MAX,
            reads: AtomicUsize::new(0),
            fail: false,
        };
        await_rendered_content(&session, Duration::ZERO).await;
        assert_eq!(session.reads.load(Ordering::SeqCst), 1);
    }
}
