//! Harvest command handlers.
//!
//! Picks a page session, runs the harvester and writes pretty JSON for the
//! persistence side to pick up.

use std::path::Path;

use serde::Serialize;
use tabak_core::{AppConfig, KnownBrand};
#[cfg(feature = "browser")]
use tabak_harvester::ChromiumSession;
use tabak_harvester::{CatalogPaths, Harvester, HttpSession, PageSession};

/// What a CLI invocation asks the harvester for.
#[derive(Debug)]
pub(crate) enum Job<'a> {
    Brands,
    Harvest {
        brand: Option<&'a str>,
        limit: Option<usize>,
    },
}

/// Loads the degraded-mode brand table. A missing file is not fatal; a
/// malformed one is.
pub(crate) fn load_known_brands_or_empty(path: &Path) -> anyhow::Result<Vec<KnownBrand>> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "known brands file not found; name lookup fallback disabled"
        );
        return Ok(Vec::new());
    }
    let file = tabak_core::load_known_brands(path)?;
    tracing::debug!(count = file.brands.len(), "loaded known brands");
    Ok(file.brands)
}

/// Runs `job` on a headless browser, or over plain HTTP when `static_pages`
/// is set or the binary was built without the `browser` feature.
///
/// # Errors
///
/// Returns an error if the session cannot be started, the catalog listing
/// cannot be loaded, or the output cannot be written. Per-brand failures are
/// recorded in the report, not propagated.
pub(crate) async fn run_job(
    config: &AppConfig,
    known: Vec<KnownBrand>,
    job: &Job<'_>,
    static_pages: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let paths = CatalogPaths::from_catalog_url(&config.scrape.catalog_url)?;

    #[cfg(feature = "browser")]
    {
        if !static_pages {
            let session = ChromiumSession::launch(&config.browser)
                .await
                .map_err(|e| anyhow::anyhow!("failed to start browser session: {e}"))?;
            let harvester = Harvester::with_paths(session, config.scrape.clone(), paths, known);
            let result = execute(&harvester, job).await;
            if let Err(e) = harvester.into_session().close().await {
                tracing::warn!(error = %e, "browser did not shut down cleanly");
            }
            return write_output(&result?, output);
        }
    }

    tracing::info!(static_pages, "using plain HTTP page session");
    let session = HttpSession::new(&config.browser.user_agent)?;
    let harvester = Harvester::with_paths(session, config.scrape.clone(), paths, known);
    let json = execute(&harvester, job).await?;
    write_output(&json, output)
}

async fn execute<S: PageSession>(harvester: &Harvester<S>, job: &Job<'_>) -> anyhow::Result<String> {
    match job {
        Job::Brands => {
            let brands = harvester.harvest_brands().await?;
            log_summary("brands", brands.len());
            to_json(&brands)
        }
        Job::Harvest { brand, limit } => {
            let report = harvester.run(*brand, *limit).await?;
            if !report.is_complete() {
                let failed: Vec<&str> = report
                    .failed_brands
                    .iter()
                    .map(|f| f.slug.as_str())
                    .collect();
                tracing::warn!(failed = ?failed, "some brands failed; report is partial");
            }
            log_summary("tobaccos", report.tobaccos.len());
            to_json(&report)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn log_summary(what: &str, count: usize) {
    tracing::info!(count, "harvested {what}");
}

fn write_output(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = json.len(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
