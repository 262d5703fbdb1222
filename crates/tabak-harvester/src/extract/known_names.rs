use std::sync::LazyLock;

use scraper::{Html, Selector};
use tabak_core::KnownBrand;

use super::{element_text, ExtractionCandidate, ExtractionContext, Strategy};
use crate::catalog::ListingTarget;

static HEADINGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"h1, h2, h3, h4, h5, h6, [class*="title"], [class*="name"]"#)
        .expect("valid heading selector")
});

/// Degraded mode: headings whose text equals a known brand name. The brand
/// URL is built from the catalog root rather than read from the page.
pub struct KnownNamesStrategy {
    known: Vec<KnownBrand>,
}

impl KnownNamesStrategy {
    #[must_use]
    pub fn new(known: Vec<KnownBrand>) -> Self {
        Self { known }
    }
}

impl Strategy for KnownNamesStrategy {
    fn name(&self) -> &'static str {
        "known-names"
    }

    fn extract(&self, doc: &Html, ctx: &ExtractionContext) -> Vec<ExtractionCandidate> {
        if ctx.target != ListingTarget::Brands || self.known.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for heading in doc.select(&HEADINGS) {
            let text = element_text(heading).to_lowercase();
            if text.is_empty() {
                continue;
            }
            let Some(brand) = self.known.iter().find(|b| b.name.to_lowercase() == text) else {
                continue;
            };
            let slug = brand.slug();
            out.push(ExtractionCandidate {
                name: brand.name.clone(),
                source_url: ctx.paths.brand_url(&slug),
                slug,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{brands_ctx, doc, items_ctx};
    use super::*;

    fn known() -> Vec<KnownBrand> {
        vec![
            KnownBrand {
                name: "Must Have".to_owned(),
                slug: Some("musthave".to_owned()),
            },
            KnownBrand {
                name: "Darkside".to_owned(),
                slug: None,
            },
        ]
    }

    #[test]
    fn matches_headings_case_insensitively() {
        let html = r#"<h2>DARKSIDE</h2><h2> Must   Have </h2><h2>Unknown Co</h2>"#;
        let out = KnownNamesStrategy::new(known()).extract(&doc(html), &brands_ctx());
        let got: Vec<_> = out
            .iter()
            .map(|c| (c.name.as_str(), c.source_url.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Darkside", "https://htreviews.org/tobaccos/darkside"),
                ("Must Have", "https://htreviews.org/tobaccos/musthave"),
            ]
        );
    }

    #[test]
    fn never_applies_to_item_listings() {
        let html = "<h2>Darkside</h2>";
        let out = KnownNamesStrategy::new(known()).extract(&doc(html), &items_ctx("darkside"));
        assert!(out.is_empty());
    }
}
