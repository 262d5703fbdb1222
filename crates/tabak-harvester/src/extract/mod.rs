//! Strategy-based extraction of catalog links from listing pages.
//!
//! The catalog's markup is not stable, so listing pages are mined by an
//! ordered chain of independent heuristics (class-named cards, raw link
//! scanning, embedded JSON-LD, known brand names) and the first strategy that
//! yields at least one candidate wins. Later strategies are never evaluated
//! once an earlier one has produced output.

mod cards;
mod known_names;
mod links;
mod metadata;

use reqwest::Url;
use scraper::{ElementRef, Html};
use tabak_core::KnownBrand;

use crate::catalog::{CatalogPaths, ListingTarget};
use crate::error::HarvestError;
use crate::normalize::{clean_text, normalize_candidates};
use crate::session::PageSession;

pub use cards::CardClassStrategy;
pub use known_names::KnownNamesStrategy;
pub use links::LinkPatternStrategy;
pub use metadata::StructuredDataStrategy;

/// A `{name, slug, sourceUrl}` triple found on a listing page, before it is
/// turned into a [`tabak_core::BrandRecord`] or followed to a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidate {
    pub name: String,
    pub slug: String,
    /// Canonical absolute URL of the linked catalog page.
    pub source_url: String,
}

impl ExtractionCandidate {
    /// Identity of the linked page. Slugs are lossy (`cola_lime` and
    /// `cola-lime` share one), so duplicates are judged by URL.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.source_url.to_lowercase()
    }
}

/// Where the listing page lives and which links it is being mined for.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub page_url: Url,
    pub paths: CatalogPaths,
    pub target: ListingTarget,
}

impl ExtractionContext {
    /// Builds a candidate for `href` if it resolves to a catalog link of the
    /// wanted kind. The name is taken as-is; cleanup happens in normalization.
    #[must_use]
    pub fn candidate(&self, href: &str, name: &str) -> Option<ExtractionCandidate> {
        let url = self.paths.resolve(&self.page_url, href)?;
        let link = self.paths.classify(&url)?;
        if !self.target.accepts(&link) {
            return None;
        }
        Some(ExtractionCandidate {
            name: name.to_owned(),
            slug: link.slug(),
            source_url: CatalogPaths::canonical(&url),
        })
    }
}

/// One extraction heuristic. Implementations are pure functions of the
/// parsed document.
pub trait Strategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn extract(&self, doc: &Html, ctx: &ExtractionContext) -> Vec<ExtractionCandidate>;
}

/// An ordered strategy chain.
pub struct Extractor {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Extractor {
    /// Strategies run in the order given; the first one is the most trusted.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Chain for the brand listing page. `known` backs the last-resort
    /// heading lookup.
    #[must_use]
    pub fn for_brands(known: Vec<KnownBrand>) -> Self {
        Self::new(vec![
            Box::new(CardClassStrategy),
            Box::new(LinkPatternStrategy),
            Box::new(StructuredDataStrategy),
            Box::new(KnownNamesStrategy::new(known)),
        ])
    }

    /// Chain for a brand page listing its tobaccos.
    #[must_use]
    pub fn for_items() -> Self {
        Self::new(vec![
            Box::new(CardClassStrategy),
            Box::new(LinkPatternStrategy),
            Box::new(StructuredDataStrategy),
        ])
    }

    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the chain against a parsed document. Each strategy's output is
    /// normalized before the emptiness check, so a strategy that only finds
    /// nameless links does not shadow the ones after it.
    #[must_use]
    pub fn extract_document(&self, doc: &Html, ctx: &ExtractionContext) -> Vec<ExtractionCandidate> {
        for strategy in &self.strategies {
            let found = normalize_candidates(strategy.extract(doc, ctx));
            if !found.is_empty() {
                tracing::debug!(
                    strategy = strategy.name(),
                    count = found.len(),
                    page = %ctx.page_url,
                    "extraction strategy matched"
                );
                return found;
            }
            tracing::trace!(strategy = strategy.name(), "extraction strategy found nothing");
        }

        tracing::debug!(page = %ctx.page_url, "no extraction strategy matched");
        Vec::new()
    }

    #[must_use]
    pub fn extract_html(&self, html: &str, ctx: &ExtractionContext) -> Vec<ExtractionCandidate> {
        let doc = Html::parse_document(html);
        self.extract_document(&doc, ctx)
    }
}

/// Reads the session's current DOM and runs `extractor` over it.
///
/// # Errors
///
/// Returns [`HarvestError`] only if the page content cannot be read. Finding
/// nothing is an empty result, not an error.
pub async fn extract_with_strategies<S: PageSession + ?Sized>(
    session: &S,
    extractor: &Extractor,
    ctx: &ExtractionContext,
) -> Result<Vec<ExtractionCandidate>, HarvestError> {
    let html = session.content().await?;
    Ok(extractor.extract_html(&html, ctx))
}

/// Whitespace-collapsed text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}
