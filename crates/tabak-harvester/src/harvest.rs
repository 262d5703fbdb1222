//! Sequential, rate-limited harvest across brands and their tobaccos.
//!
//! One page session is shared by every step. Brands are visited in the order
//! given and items in the order the listing produced them. A brand that fails
//! is recorded in the report and the run moves on.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use tabak_core::{slugify, BrandRecord, KnownBrand, ScrapeConfig, TobaccoRecord};

use crate::catalog::{CatalogPaths, ListingTarget};
use crate::detail::{parse_detail, resolve_page_url, scrape_detail, EntityKind};
use crate::error::HarvestError;
use crate::extract::{ExtractionContext, Extractor};
use crate::navigate::navigate;
use crate::normalize::{candidates_to_brands, dedup_brands, dedup_tobaccos_by_url};
use crate::readiness::await_rendered_content;
use crate::scroll::{drive_scroll, ScrollOptions, ScrollOutcome};
use crate::session::PageSession;

/// One brand's contribution to a run.
#[derive(Debug, Clone)]
pub struct BrandHarvest {
    /// The brand with description and image filled from its own page.
    pub brand: BrandRecord,
    pub tobaccos: Vec<TobaccoRecord>,
    pub listing_outcome: ScrollOutcome,
    /// Item pages that failed or had no recoverable name.
    pub skipped_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandFailure {
    pub slug: String,
    pub error: String,
}

/// Result of a harvest run, handed to the persistence collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brands: Vec<BrandRecord>,
    pub tobaccos: Vec<TobaccoRecord>,
    pub failed_brands: Vec<BrandFailure>,
}

impl HarvestReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_brands.is_empty()
    }
}

pub struct Harvester<S> {
    session: S,
    config: ScrapeConfig,
    paths: CatalogPaths,
    brand_extractor: Extractor,
    item_extractor: Extractor,
}

impl<S: PageSession> Harvester<S> {
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidUrl`] if `config.catalog_url` is not a
    /// usable catalog listing URL.
    pub fn new(
        session: S,
        config: ScrapeConfig,
        known_brands: Vec<KnownBrand>,
    ) -> Result<Self, HarvestError> {
        let paths = CatalogPaths::from_catalog_url(&config.catalog_url)?;
        Ok(Self::with_paths(session, config, paths, known_brands))
    }

    /// Builds a harvester over already validated catalog paths.
    #[must_use]
    pub fn with_paths(
        session: S,
        config: ScrapeConfig,
        paths: CatalogPaths,
        known_brands: Vec<KnownBrand>,
    ) -> Self {
        Self {
            session,
            config,
            paths,
            brand_extractor: Extractor::for_brands(known_brands),
            item_extractor: Extractor::for_items(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &S {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> S {
        self.session
    }

    #[must_use]
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Brands listed on the catalog page, deduplicated by slug. Description
    /// and image are still empty.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError`] if the catalog page cannot be loaded.
    pub async fn harvest_brands(&self) -> Result<Vec<BrandRecord>, HarvestError> {
        let catalog_url = self.paths.catalog_url().to_string();
        navigate(&self.session, &catalog_url, &self.config).await?;
        await_rendered_content(&self.session, self.config.readiness_wait()).await;

        let ctx = ExtractionContext {
            page_url: self.page_url(&catalog_url).await?,
            paths: self.paths.clone(),
            target: ListingTarget::Brands,
        };
        let extractor = &self.brand_extractor;
        let scrolled = drive_scroll(
            &self.session,
            |html: &str| extractor.extract_html(html, &ctx),
            &ScrollOptions::from_config(&self.config, None),
        )
        .await?;

        let brands = dedup_brands(candidates_to_brands(scrolled.candidates));
        tracing::info!(
            count = brands.len(),
            outcome = ?scrolled.outcome,
            scrolls = scrolled.attempts,
            "brand listing harvested"
        );
        Ok(brands)
    }

    /// Visits `brand`'s page, enriches the brand, and scrapes up to `limit`
    /// of its tobaccos.
    ///
    /// Item pages that fail or have no name are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError`] if the brand page itself cannot be loaded.
    pub async fn harvest_brand(
        &self,
        brand: &BrandRecord,
        limit: Option<usize>,
    ) -> Result<BrandHarvest, HarvestError> {
        navigate(&self.session, &brand.source_url, &self.config).await?;
        await_rendered_content(&self.session, self.config.readiness_wait()).await;

        let page_url = self.page_url(&brand.source_url).await?;
        let html = self.session.content().await?;
        let enriched = enrich_brand(brand, &html, &page_url);

        let ctx = ExtractionContext {
            page_url,
            paths: self.paths.clone(),
            target: ListingTarget::Items {
                brand: brand.slug.clone(),
            },
        };
        let extractor = &self.item_extractor;
        let listing = drive_scroll(
            &self.session,
            |html: &str| extractor.extract_html(html, &ctx),
            &ScrollOptions::from_config(&self.config, limit),
        )
        .await?;
        tracing::info!(
            brand = %brand.slug,
            items = listing.candidates.len(),
            outcome = ?listing.outcome,
            "brand item listing collected"
        );

        let mut tobaccos = Vec::new();
        let mut skipped_items = 0;
        for (index, item) in listing.candidates.iter().enumerate() {
            if limit.is_some_and(|limit| tobaccos.len() >= limit) {
                break;
            }
            if index > 0 {
                sleep_ms(self.config.delay_tobacco_ms).await;
            }

            match scrape_detail(&self.session, &item.source_url, &self.config, EntityKind::Tobacco).await {
                Ok(Some(page)) => {
                    tobaccos.push(page.into_tobacco(item.slug.clone(), item.source_url.clone()));
                }
                Ok(None) => skipped_items += 1,
                Err(e) => {
                    tracing::warn!(
                        brand = %brand.slug,
                        url = %item.source_url,
                        error = %e,
                        "tobacco page failed; skipping"
                    );
                    skipped_items += 1;
                }
            }
        }

        Ok(BrandHarvest {
            brand: enriched,
            tobaccos: dedup_tobaccos_by_url(tobaccos),
            listing_outcome: listing.outcome,
            skipped_items,
        })
    }

    /// Harvests every brand in order with `delay_brand_ms` between brands.
    ///
    /// Never fails as a whole: a brand whose harvest errors is listed in
    /// [`HarvestReport::failed_brands`] and contributes no tobaccos.
    pub async fn harvest_all(&self, brands: &[BrandRecord], limit: Option<usize>) -> HarvestReport {
        let started_at = Utc::now();
        let mut harvested_brands = Vec::with_capacity(brands.len());
        let mut tobaccos = Vec::new();
        let mut failed_brands = Vec::new();

        for (index, brand) in brands.iter().enumerate() {
            if index > 0 {
                sleep_ms(self.config.delay_brand_ms).await;
            }
            tracing::info!(
                brand = %brand.slug,
                position = index + 1,
                total = brands.len(),
                "harvesting brand"
            );

            match self.harvest_brand(brand, limit).await {
                Ok(harvest) => {
                    tracing::info!(
                        brand = %brand.slug,
                        tobaccos = harvest.tobaccos.len(),
                        skipped = harvest.skipped_items,
                        "brand harvested"
                    );
                    harvested_brands.push(harvest.brand);
                    tobaccos.extend(harvest.tobaccos);
                }
                Err(e) => {
                    tracing::warn!(brand = %brand.slug, error = %e, "brand harvest failed; continuing");
                    harvested_brands.push(brand.clone());
                    failed_brands.push(BrandFailure {
                        slug: brand.slug.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let tobaccos = dedup_tobaccos_by_url(tobaccos);
        tracing::info!(
            brands = harvested_brands.len(),
            tobaccos = tobaccos.len(),
            failed = failed_brands.len(),
            "harvest run finished"
        );

        HarvestReport {
            started_at,
            finished_at: Utc::now(),
            brands: harvested_brands,
            tobaccos,
            failed_brands,
        }
    }

    /// Lists brands, then harvests them all, or only `brand_filter`.
    ///
    /// A filtered brand missing from the listing is still visited at its
    /// conventional catalog URL.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError`] if the brand listing cannot be loaded.
    pub async fn run(
        &self,
        brand_filter: Option<&str>,
        limit: Option<usize>,
    ) -> Result<HarvestReport, HarvestError> {
        let mut brands = self.harvest_brands().await?;

        if let Some(filter) = brand_filter {
            let wanted = slugify(filter);
            brands.retain(|b| b.slug == wanted);
            if brands.is_empty() {
                tracing::warn!(brand = %wanted, "brand not in listing; using its catalog URL");
                brands.push(BrandRecord {
                    name: filter.trim().to_owned(),
                    source_url: self.paths.brand_url(&wanted),
                    slug: wanted,
                    description: String::new(),
                    image_url: String::new(),
                });
            }
        }

        Ok(self.harvest_all(&brands, limit).await)
    }

    async fn page_url(&self, requested: &str) -> Result<Url, HarvestError> {
        resolve_page_url(&self.session, requested).await
    }
}

/// Fills description and image from the brand page. The listing name and
/// slug are kept.
fn enrich_brand(brand: &BrandRecord, html: &str, page_url: &Url) -> BrandRecord {
    let mut enriched = brand.clone();
    if let Some(page) = parse_detail(html, page_url, EntityKind::Brand) {
        if enriched.description.is_empty() {
            enriched.description = page.description;
        }
        if enriched.image_url.is_empty() {
            enriched.image_url = page.image_url;
        }
    }
    enriched
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
