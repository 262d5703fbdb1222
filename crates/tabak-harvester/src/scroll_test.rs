use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::time::Instant;

use super::*;

/// A listing that reveals `per_scroll` more slugs on every scroll until
/// `total` are shown. Content is one slug per line.
struct LazyListing {
    initial: usize,
    per_scroll: usize,
    total: usize,
    scrolls: AtomicUsize,
    reads: AtomicUsize,
    fail_scroll_after: Option<usize>,
}

impl LazyListing {
    fn new(initial: usize, per_scroll: usize, total: usize) -> Self {
        Self {
            initial,
            per_scroll,
            total,
            scrolls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            fail_scroll_after: None,
        }
    }
}

#[async_trait]
impl PageSession for LazyListing {
    async fn goto(&self, _url: &str, _timeout: Duration) -> Result<(), HarvestError> {
        Ok(())
    }

    async fn content(&self) -> Result<String, HarvestError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let scrolls = self.scrolls.load(Ordering::SeqCst);
        let shown = (self.initial + scrolls * self.per_scroll).min(self.total);
        Ok((0..shown)
            .map(|i| format!("flavor-{i}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn scroll_to_bottom(&self) -> Result<(), HarvestError> {
        let done = self.scrolls.load(Ordering::SeqCst);
        if self.fail_scroll_after.is_some_and(|n| done >= n) {
            return Err(HarvestError::Session {
                operation: "scroll",
                reason: "target closed".to_owned(),
            });
        }
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        None
    }
}

fn lines(html: &str) -> Vec<ExtractionCandidate> {
    html.lines()
        .filter(|l| !l.is_empty())
        .map(|slug| ExtractionCandidate {
            name: slug.to_owned(),
            slug: slug.to_owned(),
            source_url: format!("https://htreviews.org/tobaccos/darkside/core/{slug}"),
        })
        .collect()
}

fn options(max_attempts: usize, limit: Option<usize>) -> ScrollOptions {
    ScrollOptions {
        max_attempts,
        settle: Duration::from_millis(2000),
        limit,
    }
}

#[tokio::test(start_paused = true)]
async fn stops_when_a_pass_adds_nothing() {
    // Two passes of the same 12 items: one scroll, then convergence.
    let session = LazyListing::new(12, 0, 12);
    let result = drive_scroll(&session, lines, &options(50, None)).await.unwrap();

    assert_eq!(result.outcome, ScrollOutcome::Converged);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.candidates.len(), 12);
    assert_eq!(session.reads.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn accumulates_until_the_listing_is_exhausted() {
    let session = LazyListing::new(10, 10, 35);
    let started = Instant::now();
    let result = drive_scroll(&session, lines, &options(50, None)).await.unwrap();

    assert_eq!(result.outcome, ScrollOutcome::Converged);
    assert_eq!(result.candidates.len(), 35);
    // 10 -> 20 -> 30 -> 35 -> 35
    assert_eq!(result.attempts, 4);
    assert!(started.elapsed() >= Duration::from_millis(8000));
    assert_eq!(result.candidates[0].slug, "flavor-0");
    assert_eq!(result.candidates[34].slug, "flavor-34");
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_the_attempt_cap() {
    let session = LazyListing::new(1, 1, usize::MAX);
    let result = drive_scroll(&session, lines, &options(5, None)).await.unwrap();

    assert_eq!(result.outcome, ScrollOutcome::Capped);
    assert_eq!(result.attempts, 5);
    assert_eq!(session.scrolls.load(Ordering::SeqCst), 5);
    assert_eq!(result.candidates.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn limit_halts_scrolling_early() {
    let session = LazyListing::new(4, 4, 100);
    let result = drive_scroll(&session, lines, &options(50, Some(10))).await.unwrap();

    assert_eq!(result.outcome, ScrollOutcome::LimitReached);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.candidates.len(), 12);
}

#[tokio::test(start_paused = true)]
async fn scroll_failure_keeps_collected_items() {
    let mut session = LazyListing::new(5, 5, 100);
    session.fail_scroll_after = Some(1);
    let result = drive_scroll(&session, lines, &options(50, None)).await.unwrap();

    assert_eq!(result.outcome, ScrollOutcome::Interrupted);
    assert_eq!(result.candidates.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn duplicate_slugs_within_a_pass_count_once() {
    let session = LazyListing::new(3, 0, 3);
    let doubled = |html: &str| {
        let mut out = lines(html);
        out.extend(lines(html));
        out
    };
    let result = drive_scroll(&session, doubled, &options(50, None)).await.unwrap();
    assert_eq!(result.candidates.len(), 3);
    assert_eq!(result.outcome, ScrollOutcome::Converged);
}

#[tokio::test(start_paused = true)]
async fn same_slug_on_different_pages_is_not_a_duplicate() {
    let session = LazyListing::new(1, 0, 1);
    let colliding = |_: &str| {
        ["a-b/c", "a/b-c"]
            .iter()
            .map(|path| ExtractionCandidate {
                name: (*path).to_owned(),
                slug: "a-b-c".to_owned(),
                source_url: format!("https://htreviews.org/tobaccos/darkside/{path}"),
            })
            .collect::<Vec<_>>()
    };
    let result = drive_scroll(&session, colliding, &options(50, None)).await.unwrap();
    assert_eq!(result.candidates.len(), 2);
    assert_eq!(result.outcome, ScrollOutcome::Converged);
}
