//! URL contract of the target catalog.
//!
//! Catalog links are recognised purely by path shape under the catalog root
//! segment (`tobaccos` on htreviews.org):
//!
//! ```text
//! /tobaccos/brands                      listing page (skipped)
//! /tobaccos/{brand}                     brand page
//! /tobaccos/{brand}/{line}/{flavor}     tobacco page
//! ```

use percent_encoding::percent_decode_str;
use reqwest::Url;
use tabak_core::slugify;

use crate::error::HarvestError;

/// What a catalog URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLink {
    Brand { brand: String },
    Item { brand: String, line: String, flavor: String },
}

impl CatalogLink {
    /// Dedup key: the brand segment for brands, `{line}-{flavor}` for items.
    #[must_use]
    pub fn slug(&self) -> String {
        match self {
            CatalogLink::Brand { brand } => brand.clone(),
            CatalogLink::Item { line, flavor, .. } => slugify(&format!("{line}-{flavor}")),
        }
    }

    #[must_use]
    pub fn brand(&self) -> &str {
        match self {
            CatalogLink::Brand { brand } | CatalogLink::Item { brand, .. } => brand,
        }
    }
}

/// Which kind of link a listing page is being mined for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingTarget {
    Brands,
    Items { brand: String },
}

impl ListingTarget {
    #[must_use]
    pub fn accepts(&self, link: &CatalogLink) -> bool {
        match (self, link) {
            (ListingTarget::Brands, CatalogLink::Brand { .. }) => true,
            (ListingTarget::Items { brand }, CatalogLink::Item { brand: b, .. }) => brand == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogPaths {
    base: Url,
    root: String,
    listing: Option<String>,
}

impl CatalogPaths {
    /// Derives the catalog root from the brand listing URL: its first path
    /// segment is the root and its second (if any) the listing page name.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidUrl`] if `catalog_url` is not an absolute
    /// http(s) URL with at least one path segment.
    pub fn from_catalog_url(catalog_url: &str) -> Result<Self, HarvestError> {
        let invalid = |reason: &str| HarvestError::InvalidUrl {
            url: catalog_url.to_owned(),
            reason: reason.to_owned(),
        };

        let base = Url::parse(catalog_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(invalid("expected an http(s) URL"));
        }

        let segments = path_segments(&base);
        let root = segments
            .first()
            .cloned()
            .ok_or_else(|| invalid("catalog URL needs a root path segment, e.g. /tobaccos"))?;
        let listing = segments.get(1).cloned();

        Ok(Self {
            base,
            root,
            listing,
        })
    }

    #[must_use]
    pub fn catalog_url(&self) -> &Url {
        &self.base
    }

    /// Resolves `href` against `page_url`, keeping only same-host http(s) links.
    #[must_use]
    pub fn resolve(&self, page_url: &Url, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }
        let url = page_url.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str() != self.base.host_str() {
            return None;
        }
        Some(url)
    }

    #[must_use]
    pub fn classify(&self, url: &Url) -> Option<CatalogLink> {
        if url.host_str() != self.base.host_str() {
            return None;
        }
        let segments = path_segments(url);
        if segments.first() != Some(&self.root) {
            return None;
        }

        match segments.as_slice() {
            [_, brand] => {
                if self.listing.as_deref() == Some(brand.as_str()) {
                    return None;
                }
                non_empty_slug(brand).map(|brand| CatalogLink::Brand { brand })
            }
            [_, brand, line, flavor] => Some(CatalogLink::Item {
                brand: non_empty_slug(brand)?,
                line: non_empty_slug(line)?,
                flavor: non_empty_slug(flavor)?,
            }),
            _ => None,
        }
    }

    /// Absolute brand page URL for `slug`.
    #[must_use]
    pub fn brand_url(&self, slug: &str) -> String {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.set_path(&format!("/{}/{}", self.root, slug));
        url.to_string()
    }

    /// Canonical form used as `sourceUrl`: no query, no fragment, no trailing slash.
    #[must_use]
    pub fn canonical(url: &Url) -> String {
        let mut url = url.clone();
        url.set_query(None);
        url.set_fragment(None);
        let trimmed = url.path().trim_end_matches('/').to_owned();
        if trimmed.is_empty() {
            url.set_path("/");
        } else {
            url.set_path(&trimmed);
        }
        url.to_string()
    }
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty_slug(segment: &str) -> Option<String> {
    let slug = slugify(segment);
    (!slug.is_empty()).then_some(slug)
}
