use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{element_text, ExtractionCandidate, ExtractionContext, Strategy};
use crate::normalize::clean_text;

static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static IMG_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("valid img selector"));

/// Every anchor whose path matches the catalog link pattern, in document order.
pub struct LinkPatternStrategy;

impl Strategy for LinkPatternStrategy {
    fn name(&self) -> &'static str {
        "link-pattern"
    }

    fn extract(&self, doc: &Html, ctx: &ExtractionContext) -> Vec<ExtractionCandidate> {
        doc.select(&LINKS)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                ctx.candidate(href, &link_name(link))
            })
            .collect()
    }
}

/// Link text, then `title`, then the alt text of an image inside the link.
fn link_name(link: ElementRef<'_>) -> String {
    let text = element_text(link);
    if !text.is_empty() {
        return text;
    }
    if let Some(title) = link.value().attr("title").map(clean_text) {
        if !title.is_empty() {
            return title;
        }
    }
    link.select(&IMG_ALT)
        .filter_map(|img| img.value().attr("alt"))
        .map(clean_text)
        .find(|alt| !alt.is_empty())
        .unwrap_or_default()
}
