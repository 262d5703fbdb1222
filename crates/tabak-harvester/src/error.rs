use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("page session {operation} failed: {reason}")]
    Session {
        operation: &'static str,
        reason: String,
    },
}

impl HarvestError {
    /// Returns `true` if retrying the same navigation may succeed.
    ///
    /// Network failures, timeouts, 429s and 5xx statuses are transient.
    /// Missing pages, malformed URLs and browser/session breakage are not.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            HarvestError::Http(_)
            | HarvestError::Navigation { .. }
            | HarvestError::Timeout { .. }
            | HarvestError::RateLimited { .. } => true,
            HarvestError::UnexpectedStatus { status, .. } => *status >= 500,
            HarvestError::NotFound { .. }
            | HarvestError::InvalidUrl { .. }
            | HarvestError::Browser(_)
            | HarvestError::Session { .. } => false,
        }
    }
}
