use std::path::PathBuf;

use crate::ScrapeConfig;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Browser launch settings for the headless session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Explicit Chrome/Chromium binary; discovered from common paths when unset.
    pub executable: Option<PathBuf>,
    /// DevTools endpoint of an already running browser, e.g. `"ws://localhost:9222"`.
    pub remote_url: Option<String>,
    pub headless: bool,
    pub user_agent: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            remote_url: None,
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub known_brands_path: PathBuf,
    pub scrape: ScrapeConfig,
    pub browser: BrowserSettings,
}
