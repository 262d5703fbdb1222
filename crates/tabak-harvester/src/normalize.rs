//! Cleanup and first-wins deduplication of harvested records.

use std::collections::HashSet;
use std::hash::Hash;

use tabak_core::{slugify, BrandRecord, TobaccoRecord};

use crate::extract::ExtractionCandidate;

/// Collapses every whitespace run (including NBSP and newlines) to a single
/// space and trims both ends.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased, dash-separated dedup key.
#[must_use]
pub fn normalize_slug(raw: &str) -> String {
    slugify(raw)
}

/// Keeps the first item for each key, preserving iteration order.
///
/// Idempotent: running it on its own output returns the same list.
pub fn dedup_first_wins<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Cleans names and slugs, drops candidates whose name or slug is empty after
/// cleanup, then removes later candidates pointing at an already seen page.
#[must_use]
pub fn normalize_candidates(candidates: Vec<ExtractionCandidate>) -> Vec<ExtractionCandidate> {
    let cleaned = candidates
        .into_iter()
        .filter_map(|c| {
            let name = clean_text(&c.name);
            let slug = normalize_slug(&c.slug);
            if name.is_empty() || slug.is_empty() {
                return None;
            }
            Some(ExtractionCandidate {
                name,
                slug,
                source_url: c.source_url,
            })
        })
        .collect();

    dedup_first_wins(cleaned, ExtractionCandidate::dedup_key)
}

/// Brand records as first observed on the listing page. Description and
/// image stay empty until the brand page itself is visited.
#[must_use]
pub fn candidates_to_brands(candidates: Vec<ExtractionCandidate>) -> Vec<BrandRecord> {
    normalize_candidates(candidates)
        .into_iter()
        .map(|c| BrandRecord {
            name: c.name,
            slug: c.slug,
            description: String::new(),
            image_url: String::new(),
            source_url: c.source_url,
        })
        .collect()
}

#[must_use]
pub fn dedup_brands(brands: Vec<BrandRecord>) -> Vec<BrandRecord> {
    dedup_first_wins(brands, |b: &BrandRecord| b.slug.to_lowercase())
}

/// Keyed by canonical page URL; slugs can collide within and across brands.
#[must_use]
pub fn dedup_tobaccos_by_url(tobaccos: Vec<TobaccoRecord>) -> Vec<TobaccoRecord> {
    dedup_first_wins(tobaccos, |t: &TobaccoRecord| t.source_url.to_lowercase())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
