//! Headless Chrome session over the DevTools protocol.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tabak_core::BrowserSettings;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::PageSession;
use crate::error::HarvestError;

const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const SCROLL_TO_BOTTOM_SCRIPT: &str =
    "window.scrollTo(0, Math.max(document.body.scrollHeight, document.documentElement.scrollHeight))";

/// A single browser tab reused for every navigation in a harvest run.
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launches a local browser, or attaches to `settings.remote_url` when set,
    /// and opens the tab the harvest will drive.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Browser`] if no executable is found, the browser
    /// fails to start, or the tab cannot be opened.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, HarvestError> {
        let (browser, mut handler) = match &settings.remote_url {
            Some(remote) => {
                let ws_url = resolve_ws_url(remote).await?;
                tracing::info!(ws_url, "connecting to remote browser");
                Browser::connect(ws_url)
                    .await
                    .map_err(|e| HarvestError::Browser(format!("connect failed: {e}")))?
            }
            None => {
                let executable = find_executable(settings.executable.as_deref())?;
                tracing::info!(
                    executable = %executable.display(),
                    headless = settings.headless,
                    "launching browser"
                );
                let mut builder = BrowserConfig::builder().chrome_executable(executable);
                if !settings.headless {
                    builder = builder.with_head();
                }
                let config = builder
                    .arg("--disable-blink-features=AutomationControlled")
                    .arg("--disable-dev-shm-usage")
                    .arg("--no-first-run")
                    .arg("--no-default-browser-check")
                    .arg("--no-sandbox")
                    .arg("--disable-gpu")
                    .build()
                    .map_err(|e| HarvestError::Browser(format!("invalid browser config: {e}")))?;
                Browser::launch(config)
                    .await
                    .map_err(|e| HarvestError::Browser(format!("launch failed: {e}")))?
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler stopped");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to open tab: {e}")))?;
        page.execute(SetUserAgentOverrideParams::new(settings.user_agent.clone()))
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to set user agent: {e}")))?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    /// Closes the browser and stops the protocol handler.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Browser`] if the browser refuses to close.
    pub async fn close(self) -> Result<(), HarvestError> {
        let mut browser = self.browser.into_inner();
        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| HarvestError::Browser(format!("close failed: {e}")));
        self.handler.abort();
        result
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), HarvestError> {
        tracing::debug!(url, "navigating");
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| HarvestError::Timeout {
                url: url.to_owned(),
                timeout_secs: timeout.as_secs(),
            })?
            .map_err(|e| HarvestError::Navigation {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn content(&self) -> Result<String, HarvestError> {
        self.page.content().await.map_err(|e| HarvestError::Session {
            operation: "content",
            reason: e.to_string(),
        })
    }

    async fn scroll_to_bottom(&self) -> Result<(), HarvestError> {
        self.page
            .evaluate(SCROLL_TO_BOTTOM_SCRIPT)
            .await
            .map(|_| ())
            .map_err(|e| HarvestError::Session {
                operation: "scroll",
                reason: e.to_string(),
            })
    }

    async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }
}

fn find_executable(configured: Option<&Path>) -> Result<PathBuf, HarvestError> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(HarvestError::Browser(format!(
            "configured browser executable not found: {}",
            path.display()
        )));
    }

    CHROME_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            HarvestError::Browser(
                "Chrome/Chromium not found; install it or set TABAK_BROWSER_EXECUTABLE".to_owned(),
            )
        })
}

/// Turns a DevTools HTTP endpoint into its WebSocket debugger URL via
/// `/json/version`. WebSocket URLs are returned unchanged.
async fn resolve_ws_url(remote: &str) -> Result<String, HarvestError> {
    if remote.starts_with("ws://") || remote.starts_with("wss://") {
        return Ok(remote.to_owned());
    }

    let version_url = format!("{}/json/version", remote.trim_end_matches('/'));
    let info: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .send()
        .await?
        .json()
        .await?;

    info.get("webSocketDebuggerUrl")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            HarvestError::Browser(format!("{version_url} did not report a webSocketDebuggerUrl"))
        })
}
