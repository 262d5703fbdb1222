//! schema.org JSON-LD blocks embedded in catalog pages.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::{Map, Value};

static JSONLD_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid json-ld selector")
});

/// Parses every `<script type="application/ld+json">` block in `doc`.
///
/// A malformed block is logged and skipped; it never affects the others.
pub(crate) fn json_ld_blocks(doc: &Html) -> Vec<Value> {
    let mut blocks = Vec::new();

    for script in doc.select(&JSONLD_SCRIPT) {
        let raw: String = script.text().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => blocks.push(value),
            Err(e) => tracing::debug!(error = %e, "skipping malformed JSON-LD block"),
        }
    }

    blocks
}

/// Visits every JSON object nested anywhere inside `value`, depth first.
///
/// Covers top-level arrays, `@graph` containers and `ItemList` elements
/// without special-casing them.
pub(crate) fn for_each_object<'a>(value: &'a Value, visit: &mut dyn FnMut(&'a Map<String, Value>)) {
    match value {
        Value::Object(map) => {
            visit(map);
            for child in map.values() {
                for_each_object(child, visit);
            }
        }
        Value::Array(items) => {
            for child in items {
                for_each_object(child, visit);
            }
        }
        _ => {}
    }
}

/// First object across `blocks` whose `@type` matches one of `accepted`.
pub(crate) fn find_typed<'a>(blocks: &'a [Value], accepted: &[&str]) -> Option<&'a Map<String, Value>> {
    find_object(blocks, |map| has_type(map, accepted))
}

/// First object across `blocks`, depth first, that satisfies `pred`.
pub(crate) fn find_object<'a>(
    blocks: &'a [Value],
    pred: impl Fn(&Map<String, Value>) -> bool,
) -> Option<&'a Map<String, Value>> {
    let mut found = None;
    for block in blocks {
        for_each_object(block, &mut |map| {
            if found.is_none() && pred(map) {
                found = Some(map);
            }
        });
        if found.is_some() {
            break;
        }
    }
    found
}

/// `@type` may be a plain string OR an array of strings.
pub(crate) fn has_type(map: &Map<String, Value>, accepted: &[&str]) -> bool {
    let matches = |s: &str| accepted.iter().any(|t| s.eq_ignore_ascii_case(t));
    match map.get("@type") {
        Some(Value::String(s)) => matches(s),
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// Non-empty string value of `key`.
pub(crate) fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `image` may be a URL string, an array of them, or an `ImageObject`.
pub(crate) fn image_field(map: &Map<String, Value>) -> Option<String> {
    fn from_value(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Value::Array(items) => items.iter().find_map(from_value),
            Value::Object(obj) => str_field(obj, "url")
                .or_else(|| str_field(obj, "contentUrl"))
                .map(str::to_owned),
            _ => None,
        }
    }
    map.get("image").and_then(from_value)
}

/// Numeric value that may be serialized as a number or a string.
pub(crate) fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => crate::parse_helpers::first_numeric_token(s),
        _ => None,
    }
}
