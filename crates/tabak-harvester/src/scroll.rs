//! Infinite-scroll pagination with convergence detection.
//!
//! The catalog exposes no "has more" signal, so the driver scrolls, waits for
//! the lazy loader, re-extracts, and stops once a pass adds nothing new. The
//! attempt cap guarantees termination even if the page keeps growing.

use std::collections::HashSet;
use std::time::Duration;

use tabak_core::ScrapeConfig;

use crate::error::HarvestError;
use crate::extract::ExtractionCandidate;
use crate::session::PageSession;

#[derive(Debug, Clone)]
pub struct ScrollOptions {
    /// Hard cap on scroll/extract cycles after the initial pass.
    pub max_attempts: usize,
    /// Pause after each scroll before re-extracting.
    pub settle: Duration,
    /// Stop scrolling once this many distinct candidates are collected.
    pub limit: Option<usize>,
}

impl ScrollOptions {
    #[must_use]
    pub fn from_config(config: &ScrapeConfig, limit: Option<usize>) -> Self {
        Self {
            max_attempts: config.max_scroll_attempts,
            settle: config.scroll_settle(),
            limit,
        }
    }
}

/// Why the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// A pass added no new candidates.
    Converged,
    /// `max_attempts` cycles ran without converging.
    Capped,
    /// The caller's limit was satisfied.
    LimitReached,
    /// Scrolling or re-reading the page failed after the first pass; the
    /// candidates collected so far are kept.
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct ScrollResult {
    pub candidates: Vec<ExtractionCandidate>,
    pub outcome: ScrollOutcome,
    /// Scroll cycles performed, excluding the initial extraction.
    pub attempts: usize,
}

/// Scrolls `session` until extraction converges, the cap is hit, or `limit`
/// candidates have been seen.
///
/// `extract` receives the page HTML on every pass. Results are merged
/// first-wins by slug, in the order they were first observed. The list is not
/// truncated to `limit`; callers cap their own per-item loops.
///
/// # Errors
///
/// Returns [`HarvestError`] only if the initial page read fails. Later
/// failures end the loop with [`ScrollOutcome::Interrupted`].
pub async fn drive_scroll<S, F>(
    session: &S,
    mut extract: F,
    options: &ScrollOptions,
) -> Result<ScrollResult, HarvestError>
where
    S: PageSession + ?Sized,
    F: FnMut(&str) -> Vec<ExtractionCandidate> + Send,
{
    let mut collected = Vec::new();
    let mut seen = HashSet::new();

    let html = session.content().await?;
    merge(&mut collected, &mut seen, extract(&html));

    let mut attempts = 0;
    let outcome = loop {
        if options.limit.is_some_and(|limit| collected.len() >= limit) {
            break ScrollOutcome::LimitReached;
        }
        if attempts >= options.max_attempts {
            tracing::info!(
                attempts,
                collected = collected.len(),
                "scroll attempt cap reached"
            );
            break ScrollOutcome::Capped;
        }

        attempts += 1;
        let previous = collected.len();

        if let Err(e) = session.scroll_to_bottom().await {
            tracing::warn!(attempt = attempts, error = %e, "scroll failed; keeping collected items");
            break ScrollOutcome::Interrupted;
        }
        tokio::time::sleep(options.settle).await;

        let html = match session.content().await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "page read failed after scroll");
                break ScrollOutcome::Interrupted;
            }
        };
        merge(&mut collected, &mut seen, extract(&html));

        if collected.len() == previous {
            tracing::debug!(attempts, collected = previous, "scroll pagination converged");
            break ScrollOutcome::Converged;
        }
        tracing::debug!(
            attempt = attempts,
            new = collected.len() - previous,
            total = collected.len(),
            "scroll loaded more items"
        );
    };

    Ok(ScrollResult {
        candidates: collected,
        outcome,
        attempts,
    })
}

fn merge(
    collected: &mut Vec<ExtractionCandidate>,
    seen: &mut HashSet<String>,
    batch: Vec<ExtractionCandidate>,
) {
    for candidate in batch {
        if seen.insert(candidate.dedup_key()) {
            collected.push(candidate);
        }
    }
}

#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;
