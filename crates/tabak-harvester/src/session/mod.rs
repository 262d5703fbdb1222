//! The browser automation seam.
//!
//! Every harvester component talks to the catalog through one shared
//! [`PageSession`]. Calls are strictly sequential; implementations only need
//! interior mutability for their "current page" state.

#[cfg(feature = "browser")]
mod chromium;
mod http;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::HarvestError;

#[cfg(feature = "browser")]
pub use chromium::ChromiumSession;
pub use http::HttpSession;

#[async_trait]
pub trait PageSession: Send + Sync {
    /// Points the session at `url` and returns once the load has settled.
    ///
    /// A single attempt; retries belong to [`crate::navigate::navigate`].
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), HarvestError>;

    /// Serialized DOM of the current page as it is rendered right now.
    async fn content(&self) -> Result<String, HarvestError>;

    /// Scrolls to the bottom of the document to trigger lazy loading.
    async fn scroll_to_bottom(&self) -> Result<(), HarvestError>;

    /// URL of the current page after redirects, if any page is loaded.
    async fn current_url(&self) -> Option<String>;
}
