use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, BrowserSettings, DEFAULT_USER_AGENT};
use crate::{ConfigError, ScrapeConfig};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; defaults mirror [`ScrapeConfig::default`] and
/// [`BrowserSettings::default`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    let defaults = ScrapeConfig::default();

    let scrape = ScrapeConfig {
        catalog_url: or_default("TABAK_CATALOG_URL", &defaults.catalog_url),
        timeout_secs: parse_var(&lookup, "TABAK_HARVEST_TIMEOUT_SECS", defaults.timeout_secs)?,
        max_retries: parse_var(&lookup, "TABAK_HARVEST_MAX_RETRIES", defaults.max_retries)?,
        retry_backoff_base_ms: parse_var(
            &lookup,
            "TABAK_HARVEST_RETRY_BACKOFF_BASE_MS",
            defaults.retry_backoff_base_ms,
        )?,
        delay_brand_ms: parse_var(&lookup, "TABAK_HARVEST_DELAY_BRAND_MS", defaults.delay_brand_ms)?,
        delay_tobacco_ms: parse_var(
            &lookup,
            "TABAK_HARVEST_DELAY_TOBACCO_MS",
            defaults.delay_tobacco_ms,
        )?,
        readiness_wait_ms: parse_var(
            &lookup,
            "TABAK_HARVEST_READINESS_WAIT_MS",
            defaults.readiness_wait_ms,
        )?,
        scroll_settle_ms: parse_var(
            &lookup,
            "TABAK_HARVEST_SCROLL_SETTLE_MS",
            defaults.scroll_settle_ms,
        )?,
        max_scroll_attempts: parse_var(
            &lookup,
            "TABAK_HARVEST_MAX_SCROLL_ATTEMPTS",
            defaults.max_scroll_attempts,
        )?,
    };

    if scrape.max_scroll_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TABAK_HARVEST_MAX_SCROLL_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let browser = BrowserSettings {
        executable: optional("TABAK_BROWSER_EXECUTABLE").map(PathBuf::from),
        remote_url: optional("TABAK_BROWSER_REMOTE_URL"),
        headless: parse_bool(&or_default("TABAK_BROWSER_HEADLESS", "true"))
            .ok_or_else(|| ConfigError::InvalidEnvVar {
                var: "TABAK_BROWSER_HEADLESS".to_string(),
                reason: "expected true/false".to_string(),
            })?,
        user_agent: or_default("TABAK_USER_AGENT", DEFAULT_USER_AGENT),
    };

    Ok(AppConfig {
        log_level: or_default("TABAK_LOG_LEVEL", "info"),
        known_brands_path: PathBuf::from(or_default(
            "TABAK_KNOWN_BRANDS_PATH",
            "./config/known_brands.yaml",
        )),
        scrape,
        browser,
    })
}

fn parse_var<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
