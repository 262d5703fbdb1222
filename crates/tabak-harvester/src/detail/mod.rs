//! Detail page scraping: one brand or tobacco page into one record.
//!
//! Every field is read through a cascade of sources, first non-empty wins.
//! Description and image prefer embedded JSON-LD over visible text.

mod attributes;
mod cascade;

use reqwest::Url;
use scraper::Html;
use serde_json::Value;
use tabak_core::{ScrapeConfig, TobaccoMetadata, TobaccoRecord};

use crate::catalog::CatalogPaths;
use crate::error::HarvestError;
use crate::navigate::navigate;
use crate::readiness::await_rendered_content;
use crate::session::PageSession;
use crate::structured::{find_object, find_typed, has_type, json_ld_blocks, str_field};

pub use attributes::{match_attribute, Attribute};

/// What kind of catalog entity a detail page describes. Selects which JSON-LD
/// `@type`s are trusted for that page.
///
/// A brand page's `Organization` counts only when its `url` or `@id` is the
/// page itself; the site's own publisher block is on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Brand,
    Tobacco,
}

impl EntityKind {
    #[must_use]
    pub fn schema_types(self) -> &'static [&'static str] {
        match self {
            EntityKind::Brand => &["Brand"],
            EntityKind::Tobacco => &["Product", "IndividualProduct"],
        }
    }
}

/// Fields recovered from one detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub metadata: TobaccoMetadata,
}

impl DetailPage {
    #[must_use]
    pub fn into_tobacco(self, slug: String, source_url: String) -> TobaccoRecord {
        TobaccoRecord {
            name: self.name,
            slug,
            description: self.description,
            image_url: self.image_url,
            source_url,
            metadata: self.metadata,
        }
    }
}

/// Runs every field cascade over an already-rendered page.
///
/// Returns `None` when no name can be recovered; such a page is not a record.
#[must_use]
pub fn parse_detail(html: &str, page_url: &Url, kind: EntityKind) -> Option<DetailPage> {
    let doc = Html::parse_document(html);
    let blocks = json_ld_blocks(&doc);
    let entity = page_entity(&blocks, kind, page_url);

    let name = cascade::name(&doc, entity)?;
    let description = cascade::description(&doc, entity).unwrap_or_default();
    let image_url = cascade::image(&doc, entity, page_url).unwrap_or_default();

    let metadata = match kind {
        EntityKind::Brand => TobaccoMetadata::default(),
        EntityKind::Tobacco => {
            let rating_node = cascade::aggregate_rating(&blocks, entity);
            let mut metadata = attributes::extract(&doc, entity);
            metadata.rating = cascade::rating(&doc, rating_node);
            metadata.reviews_count = cascade::reviews_count(&doc, rating_node);
            metadata
        }
    };

    Some(DetailPage {
        name,
        description,
        image_url,
        metadata,
    })
}

/// The JSON-LD object describing this page's entity, if any.
fn page_entity<'a>(blocks: &'a [Value], kind: EntityKind, page_url: &Url) -> Entity<'a> {
    find_typed(blocks, kind.schema_types()).or_else(|| match kind {
        EntityKind::Brand => find_object(blocks, |map| {
            has_type(map, &["Organization"]) && describes_page(map, page_url)
        }),
        EntityKind::Tobacco => None,
    })
}

/// Whether `map`'s `url` or `@id` resolves to `page_url`, ignoring query,
/// fragment, trailing slash and case.
fn describes_page(map: &serde_json::Map<String, Value>, page_url: &Url) -> bool {
    let page = CatalogPaths::canonical(page_url).to_lowercase();
    ["url", "@id"]
        .iter()
        .filter_map(|key| str_field(map, key))
        .filter_map(|raw| page_url.join(raw).ok())
        .any(|url| CatalogPaths::canonical(&url).to_lowercase() == page)
}

/// Navigates to `url`, waits for rendering and parses the page.
///
/// # Errors
///
/// Returns [`HarvestError`] if navigation exhausts its retries, the page
/// cannot be read, or `url` is not a valid URL. A page without a name is
/// `Ok(None)`, not an error.
pub async fn scrape_detail<S: PageSession + ?Sized>(
    session: &S,
    url: &str,
    config: &ScrapeConfig,
    kind: EntityKind,
) -> Result<Option<DetailPage>, HarvestError> {
    navigate(session, url, config).await?;
    await_rendered_content(session, config.readiness_wait()).await;
    let html = session.content().await?;
    let page_url = resolve_page_url(session, url).await?;

    let detail = parse_detail(&html, &page_url, kind);
    if detail.is_none() {
        tracing::warn!(url, ?kind, "no name found on detail page; skipping");
    }
    Ok(detail)
}

/// The session's post-redirect URL, falling back to the requested one.
pub(crate) async fn resolve_page_url<S: PageSession + ?Sized>(
    session: &S,
    requested: &str,
) -> Result<Url, HarvestError> {
    if let Some(current) = session.current_url().await {
        if let Ok(url) = Url::parse(&current) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(url);
            }
        }
    }
    Url::parse(requested).map_err(|e| HarvestError::InvalidUrl {
        url: requested.to_owned(),
        reason: e.to_string(),
    })
}

/// Shorthand for JSON-LD entity lookups in the cascades.
type Entity<'a> = Option<&'a serde_json::Map<String, Value>>;

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
