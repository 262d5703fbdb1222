//! Labelled domain attributes (strength, cut, flavor profile).
//!
//! Sources, in order: JSON-LD `additionalProperty`, `dt`/`dd` pairs, two-cell
//! table rows, label elements followed by a value sibling, then short
//! `Label: value` text blocks. The first value found for an attribute wins.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tabak_core::TobaccoMetadata;

use super::Entity;
use crate::extract::element_text;
use crate::normalize::clean_text;
use crate::structured::str_field;

const MAX_VALUE_CHARS: usize = 100;
const MAX_INLINE_BLOCK_CHARS: usize = 120;

static DT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").expect("valid dt selector"));
static ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));
static CELLS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid cell selector"));
static LABELS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="label"], [class*="key"]"#).expect("valid label selector")
});
static INLINE_BLOCKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[class*="param"], [class*="characteristic"], [class*="spec"], [class*="attribute"], li"#,
    )
    .expect("valid attribute block selector")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Strength,
    Cut,
    FlavorProfile,
}

/// Maps a label such as `"Крепость:"` or `"Flavor profile"` to an attribute.
#[must_use]
pub fn match_attribute(label: &str) -> Option<Attribute> {
    let label = clean_text(label).trim_end_matches(':').trim().to_lowercase();
    if label.is_empty() || label.chars().count() > 40 {
        return None;
    }
    if label.contains("strength") || label.contains("крепость") {
        Some(Attribute::Strength)
    } else if label.contains("cut") || label.contains("нарезка") {
        Some(Attribute::Cut)
    } else if ["flavor", "flavour", "taste", "вкус"]
        .iter()
        .any(|k| label.contains(k))
    {
        Some(Attribute::FlavorProfile)
    } else {
        None
    }
}

/// Reads every attribute source; `rating` and `reviews_count` are left unset.
pub(super) fn extract(doc: &Html, entity: Entity<'_>) -> TobaccoMetadata {
    let mut metadata = TobaccoMetadata::default();

    if let Some(props) = entity
        .and_then(|e| e.get("additionalProperty"))
        .and_then(Value::as_array)
    {
        for prop in props.iter().filter_map(Value::as_object) {
            if let (Some(label), Some(value)) = (str_field(prop, "name"), property_value(prop)) {
                record(&mut metadata, label, &value);
            }
        }
    }

    for dt in doc.select(&DT) {
        if let Some(dd) = next_element(dt).filter(|el| el.value().name() == "dd") {
            record(&mut metadata, &element_text(dt), &element_text(dd));
        }
    }

    for row in doc.select(&ROWS) {
        let cells: Vec<_> = row.select(&CELLS).collect();
        if let [label, value] = cells.as_slice() {
            record(&mut metadata, &element_text(*label), &element_text(*value));
        }
    }

    for label in doc.select(&LABELS) {
        if let Some(value) = next_element(label) {
            record(&mut metadata, &element_text(label), &element_text(value));
        }
    }

    for block in doc.select(&INLINE_BLOCKS) {
        let text = element_text(block);
        if text.chars().count() > MAX_INLINE_BLOCK_CHARS {
            continue;
        }
        if let Some((label, value)) = text.split_once(':') {
            record(&mut metadata, label, value);
        }
    }

    metadata
}

/// `value` of a schema.org `PropertyValue`, as text.
fn property_value(prop: &serde_json::Map<String, Value>) -> Option<String> {
    match prop.get("value")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Stores `value` under the attribute `label` names, unless that attribute
/// already has a value.
fn record(metadata: &mut TobaccoMetadata, label: &str, value: &str) {
    let Some(attribute) = match_attribute(label) else {
        return;
    };
    let value = clean_text(value);
    if value.is_empty() || value.chars().count() > MAX_VALUE_CHARS {
        return;
    }

    let slot = match attribute {
        Attribute::Strength => &mut metadata.strength,
        Attribute::Cut => &mut metadata.cut,
        Attribute::FlavorProfile => &mut metadata.flavor_profile,
    };
    if slot.is_none() {
        *slot = Some(value);
    }
}
