//! Plain HTTP page session for catalogs that render server-side.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::PageSession;
use crate::error::HarvestError;

struct LoadedPage {
    url: String,
    body: String,
}

/// A [`PageSession`] backed by `reqwest`. No JavaScript runs, so
/// [`PageSession::scroll_to_bottom`] is a no-op and scroll pagination
/// converges after a single pass.
pub struct HttpSession {
    client: Client,
    page: Mutex<Option<LoadedPage>>,
}

impl HttpSession {
    /// # Errors
    ///
    /// Returns [`HarvestError::Http`] if the underlying client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            page: Mutex::new(None),
        })
    }

    fn store(&self, page: Option<LoadedPage>) {
        let mut guard = self
            .page
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = page;
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), HarvestError> {
        // A failed navigation leaves no page behind, like a browser error page.
        self.store(None);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HarvestError::Timeout {
                        url: url.to_owned(),
                        timeout_secs: timeout.as_secs(),
                    }
                } else {
                    HarvestError::Http(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(HarvestError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HarvestError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(HarvestError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        tracing::debug!(url, final_url, bytes = body.len(), "page loaded");

        self.store(Some(LoadedPage {
            url: final_url,
            body,
        }));
        Ok(())
    }

    async fn content(&self) -> Result<String, HarvestError> {
        let guard = self
            .page
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .as_ref()
            .map(|p| p.body.clone())
            .ok_or(HarvestError::Session {
                operation: "content",
                reason: "no page loaded".to_owned(),
            })
    }

    async fn scroll_to_bottom(&self) -> Result<(), HarvestError> {
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        let guard = self
            .page
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.as_ref().map(|p| p.url.clone())
    }
}
