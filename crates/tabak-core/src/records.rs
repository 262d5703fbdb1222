use serde::{Deserialize, Serialize};

/// A tobacco brand as listed by the catalog.
///
/// `description` and `image_url` stay empty until the brand's own page has
/// been visited during a harvest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecord {
    pub name: String,
    /// Lowercase catalog path segment, e.g. `"darkside"`. Unique per run.
    pub slug: String,
    pub description: String,
    pub image_url: String,
    /// Canonical brand page URL, e.g. `"https://htreviews.org/tobaccos/darkside"`.
    pub source_url: String,
}

impl BrandRecord {
    /// Returns `true` once the brand page has contributed a description or image.
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        !self.description.is_empty() || !self.image_url.is_empty()
    }
}

/// A single tobacco flavor scraped from its detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TobaccoRecord {
    pub name: String,
    /// `{line}-{flavor}` path segments, unique within the owning brand.
    pub slug: String,
    pub description: String,
    pub image_url: String,
    pub source_url: String,
    pub metadata: TobaccoMetadata,
}

impl TobaccoRecord {
    /// Returns `true` when this tobacco's page lives under `brand`'s page.
    ///
    /// The harvester does not store a brand reference on the record; ownership
    /// is recovered from URL path containment.
    #[must_use]
    pub fn belongs_to(&self, brand: &BrandRecord) -> bool {
        let prefix = brand.source_url.trim_end_matches('/');
        self.source_url
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Domain attributes read from a tobacco detail page. Missing or unparsable
/// values are `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TobaccoMetadata {
    pub strength: Option<String>,
    pub cut: Option<String>,
    pub flavor_profile: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
}
