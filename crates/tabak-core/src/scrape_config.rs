use std::time::Duration;

/// Per-run harvest settings. Built once by the caller and never mutated
/// while a harvest is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Brand listing page, e.g. `"https://htreviews.org/tobaccos/brands"`.
    pub catalog_url: String,
    /// Per-navigation timeout.
    pub timeout_secs: u64,
    /// Additional navigation attempts after the first failure.
    pub max_retries: u32,
    /// Base delay for exponential backoff: `base * 2^attempt`.
    pub retry_backoff_base_ms: u64,
    /// Pause before every brand except the first.
    pub delay_brand_ms: u64,
    /// Pause before every tobacco page except the first within a brand.
    pub delay_tobacco_ms: u64,
    /// Upper bound on the content readiness wait.
    pub readiness_wait_ms: u64,
    /// Pause after each scroll-to-bottom before re-extracting.
    pub scroll_settle_ms: u64,
    /// Hard cap on scroll iterations per listing page.
    pub max_scroll_attempts: usize,
}

impl ScrapeConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn readiness_wait(&self) -> Duration {
        Duration::from_millis(self.readiness_wait_ms)
    }

    #[must_use]
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            catalog_url: "https://htreviews.org/tobaccos/brands".to_owned(),
            timeout_secs: 30,
            max_retries: 3,
            retry_backoff_base_ms: 2000,
            delay_brand_ms: 3000,
            delay_tobacco_ms: 1500,
            readiness_wait_ms: 5000,
            scroll_settle_ms: 2000,
            max_scroll_attempts: 50,
        }
    }
}
