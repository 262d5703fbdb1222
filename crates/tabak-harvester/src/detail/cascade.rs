//! Per-field source cascades for detail pages.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use super::Entity;
use crate::extract::element_text;
use crate::normalize::clean_text;
use crate::parse_helpers::{parse_count, parse_rating};
use crate::structured::{find_typed, image_field, number_field, str_field};

/// Visible-text descriptions shorter than this are labels, not descriptions.
pub(super) const MIN_DESCRIPTION_CHARS: usize = 30;

const MAX_NAME_CHARS: usize = 200;

/// Numeric fragments are read from short elements only; a long block with a
/// digit in it is prose, not a rating widget.
const MAX_NUMERIC_TEXT_CHARS: usize = 40;

/// Catalog ratings are on a 5 or 10 point scale; anything above is a count.
const MAX_RATING: f64 = 10.0;

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .map(|s| Selector::parse(s).expect("valid cascade selector"))
        .collect()
}

static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"h1[itemprop="name"]"#,
        ".tobacco-name",
        ".product-title",
        r#"[itemprop="name"]"#,
        "h1",
        r#"[class*="title"] h1"#,
        r#"[class*="title"]"#,
        "h2",
    ])
});

static DESCRIPTION_META: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"meta[property="og:description"]"#,
        r#"meta[name="description"]"#,
    ])
});

static DESCRIPTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[itemprop="description"]"#,
        r#"[class*="description"]"#,
        ".about",
        "article p",
        "main p",
    ])
});

static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("valid og:title selector")
});
static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:image"]"#).expect("valid og:image selector")
});

static IMAGE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[itemprop="image"]"#,
        r#"[class*="image"] img"#,
        r#"[class*="photo"] img"#,
        "main img",
        "img",
    ])
});

static RATING_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[itemprop="ratingValue"]"#, r#"[class*="rating"]"#]));

static REVIEW_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[itemprop="reviewCount"]"#,
        r#"[itemprop="ratingCount"]"#,
        r#"[class*="review"]"#,
    ])
});

// -----------------------------------------------------------------------
// name
// -----------------------------------------------------------------------

pub(super) fn name(doc: &Html, entity: Entity<'_>) -> Option<String> {
    NAME_SELECTORS
        .iter()
        .flat_map(|selector| doc.select(selector))
        .map(element_text)
        .find(|text| !text.is_empty() && text.chars().count() <= MAX_NAME_CHARS)
        .or_else(|| meta_content(doc, &OG_TITLE))
        .or_else(|| entity.and_then(|e| str_field(e, "name")).map(clean_text))
        .filter(|name| !name.is_empty())
}

// -----------------------------------------------------------------------
// description
// -----------------------------------------------------------------------

pub(super) fn description(doc: &Html, entity: Entity<'_>) -> Option<String> {
    if let Some(text) = entity
        .and_then(|e| str_field(e, "description"))
        .map(clean_text)
        .filter(|t| !t.is_empty())
    {
        return Some(text);
    }

    if let Some(text) = DESCRIPTION_META
        .iter()
        .find_map(|selector| meta_content(doc, selector))
    {
        return Some(text);
    }

    DESCRIPTION_SELECTORS
        .iter()
        .flat_map(|selector| doc.select(selector))
        .map(element_text)
        .find(|text| text.chars().count() >= MIN_DESCRIPTION_CHARS)
}

// -----------------------------------------------------------------------
// image
// -----------------------------------------------------------------------

pub(super) fn image(doc: &Html, entity: Entity<'_>, page_url: &Url) -> Option<String> {
    let absolute = |raw: &str| absolutize(raw, page_url);

    entity
        .and_then(image_field)
        .and_then(|raw| absolute(&raw))
        .or_else(|| meta_content(doc, &OG_IMAGE).and_then(|raw| absolute(&raw)))
        .or_else(|| {
            IMAGE_SELECTORS
                .iter()
                .flat_map(|selector| doc.select(selector))
                .filter_map(image_source)
                .find_map(absolute)
        })
}

/// `src` for images, `content` for `<meta itemprop="image">`, then the usual
/// lazy-loading attributes.
fn image_source(element: ElementRef<'_>) -> Option<&str> {
    let el = element.value();
    ["src", "content", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|attr| el.attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn absolutize(raw: &str, page_url: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    let url = page_url.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

// -----------------------------------------------------------------------
// rating / reviews
// -----------------------------------------------------------------------

/// `aggregateRating` of the page entity, or any standalone `AggregateRating`.
pub(super) fn aggregate_rating<'a>(
    blocks: &'a [Value],
    entity: Entity<'a>,
) -> Option<&'a Map<String, Value>> {
    entity
        .and_then(|e| e.get("aggregateRating"))
        .and_then(Value::as_object)
        .or_else(|| find_typed(blocks, &["AggregateRating"]))
}

pub(super) fn rating(doc: &Html, aggregate: Option<&Map<String, Value>>) -> Option<f64> {
    aggregate
        .and_then(|a| number_field(a, "ratingValue"))
        .filter(|v| in_rating_scale(*v))
        .or_else(|| {
            first_parsed(doc, &RATING_SELECTORS, is_rating_value, |text| {
                parse_rating(text).filter(|v| in_rating_scale(*v))
            })
        })
}

fn in_rating_scale(value: f64) -> bool {
    (0.0..=MAX_RATING).contains(&value)
}

/// `[class*="rating"]` also hits `ratings-count` and `rating-reviews`
/// elements, which hold counts.
fn is_rating_value(element: ElementRef<'_>) -> bool {
    let class = element.value().attr("class").unwrap_or_default().to_lowercase();
    !class.contains("count") && !class.contains("review")
}

pub(super) fn reviews_count(doc: &Html, aggregate: Option<&Map<String, Value>>) -> Option<u32> {
    aggregate
        .and_then(|a| count_field(a, "reviewCount").or_else(|| count_field(a, "ratingCount")))
        .or_else(|| first_parsed(doc, &REVIEW_SELECTORS, |_| true, parse_count))
}

fn count_field(map: &Map<String, Value>, key: &str) -> Option<u32> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => parse_count(s),
        _ => None,
    }
}

/// First short element (or `content` attribute) across `list` that passes
/// `accept` and that `parse` accepts.
fn first_parsed<T>(
    doc: &Html,
    list: &[Selector],
    accept: fn(ElementRef<'_>) -> bool,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    list.iter()
        .flat_map(|selector| doc.select(selector))
        .filter(|el| accept(*el))
        .filter_map(|el| {
            el.value()
                .attr("content")
                .map(clean_text)
                .or_else(|| Some(element_text(el)))
        })
        .filter(|text| !text.is_empty() && text.chars().count() <= MAX_NUMERIC_TEXT_CHARS)
        .find_map(|text| parse(&text))
}

fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(clean_text)
        .find(|c| !c.is_empty())
}
