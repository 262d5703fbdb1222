use tabak_core::TobaccoMetadata;

use super::*;

fn candidate(name: &str, slug: &str) -> ExtractionCandidate {
    ExtractionCandidate {
        name: name.to_owned(),
        slug: slug.to_owned(),
        source_url: format!("https://htreviews.org/tobaccos/{slug}"),
    }
}

fn tobacco(slug: &str, url: &str, name: &str) -> TobaccoRecord {
    TobaccoRecord {
        name: name.to_owned(),
        slug: slug.to_owned(),
        description: String::new(),
        image_url: String::new(),
        source_url: url.to_owned(),
        metadata: TobaccoMetadata::default(),
    }
}

// -----------------------------------------------------------------------
// clean_text / normalize_slug
// -----------------------------------------------------------------------

#[test]
fn clean_text_collapses_internal_runs() {
    assert_eq!(clean_text("  Black \n\t Burn\u{a0} "), "Black Burn");
}

#[test]
fn clean_text_of_whitespace_is_empty() {
    assert_eq!(clean_text(" \n "), "");
}

#[test]
fn normalized_slugs_are_lowercase_without_whitespace() {
    for raw in ["DarkSide", "  Must  Have ", "Black\tBurn", "ЧЁРНЫЙ ЛЁД"] {
        let slug = normalize_slug(raw);
        assert_eq!(slug, slug.to_lowercase(), "{raw}");
        assert!(!slug.chars().any(char::is_whitespace), "{raw}");
        assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{raw}");
        assert!(!slug.contains("--"), "{raw}");
    }
}

// -----------------------------------------------------------------------
// dedup_first_wins
// -----------------------------------------------------------------------

#[test]
fn dedup_keeps_first_occurrence() {
    let items = vec![("a", 1), ("b", 2), ("a", 3)];
    let out = dedup_first_wins(items, |(k, _)| *k);
    assert_eq!(out, vec![("a", 1), ("b", 2)]);
}

#[test]
fn dedup_is_idempotent() {
    let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
    let once = dedup_first_wins(items, |(k, _)| *k);
    let twice = dedup_first_wins(once.clone(), |(k, _)| *k);
    assert_eq!(once, twice);
}

// -----------------------------------------------------------------------
// normalize_candidates
// -----------------------------------------------------------------------

#[test]
fn normalize_candidates_drops_empty_names() {
    let out = normalize_candidates(vec![candidate("   ", "darkside"), candidate("Darkside", "darkside")]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Darkside");
}

#[test]
fn normalize_candidates_dedups_case_insensitively_first_wins() {
    let out = normalize_candidates(vec![
        candidate("Must Have", "MustHave"),
        candidate("Darkside", "darkside"),
        candidate("MUST HAVE (dup)", "musthave"),
    ]);
    let slugs: Vec<_> = out.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["musthave", "darkside"]);
    assert_eq!(out[0].name, "Must Have");
}

#[test]
fn normalize_candidates_cleans_names() {
    let out = normalize_candidates(vec![candidate("  Black\n   Burn ", "blackburn")]);
    assert_eq!(out[0].name, "Black Burn");
}

// -----------------------------------------------------------------------
// records
// -----------------------------------------------------------------------

#[test]
fn candidates_to_brands_leaves_page_fields_empty() {
    let brands = candidates_to_brands(vec![candidate("Darkside", "darkside")]);
    assert_eq!(brands.len(), 1);
    assert!(brands[0].description.is_empty());
    assert!(brands[0].image_url.is_empty());
    assert_eq!(brands[0].source_url, "https://htreviews.org/tobaccos/darkside");
}

#[test]
fn normalize_candidates_keeps_distinct_pages_sharing_a_slug() {
    let out = normalize_candidates(vec![
        ExtractionCandidate {
            name: "Cola Lime".to_owned(),
            slug: "core-cola-lime".to_owned(),
            source_url: "https://htreviews.org/tobaccos/x/core/cola_lime".to_owned(),
        },
        ExtractionCandidate {
            name: "Cola-Lime".to_owned(),
            slug: "core-cola-lime".to_owned(),
            source_url: "https://htreviews.org/tobaccos/x/core/cola-lime".to_owned(),
        },
    ]);
    assert_eq!(out.len(), 2);
}

#[test]
fn dedup_tobaccos_by_url_keeps_same_slug_within_a_brand() {
    let out = dedup_tobaccos_by_url(vec![
        tobacco("a-b-c", "https://x/tobaccos/d/a-b/c", "first"),
        tobacco("a-b-c", "https://x/tobaccos/d/a/b-c", "second"),
    ]);
    assert_eq!(out.len(), 2);
}

#[test]
fn dedup_tobaccos_by_url_keeps_same_slug_from_other_brand() {
    let out = dedup_tobaccos_by_url(vec![
        tobacco("classic-mint", "https://x/tobaccos/a/classic/mint", "A mint"),
        tobacco("classic-mint", "https://x/tobaccos/b/classic/mint", "B mint"),
        tobacco("classic-mint", "https://x/tobaccos/a/classic/mint", "A mint again"),
    ]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].name, "A mint");
    assert_eq!(out[1].name, "B mint");
}
