use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{element_text, ExtractionCandidate, ExtractionContext, Strategy};

/// Class-name fragments that mark a catalog card.
const CARD_CLASS_FRAGMENTS: &[&str] = &[
    "card", "tile", "item", "brand", "tobacco", "product", "catalog",
];

static CLASSED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class]").expect("valid class selector"));
static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid heading selector"));
static NAMED: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="name"], [class*="title"]"#).expect("valid name selector")
});
static IMG_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("valid img selector"));

/// Elements whose class names look like catalog cards, each linking to exactly
/// one catalog page. Containers wrapping many cards are skipped.
pub struct CardClassStrategy;

impl Strategy for CardClassStrategy {
    fn name(&self) -> &'static str {
        "card-class"
    }

    fn extract(&self, doc: &Html, ctx: &ExtractionContext) -> Vec<ExtractionCandidate> {
        doc.select(&CLASSED)
            .filter(|el| is_card(*el))
            .filter_map(|card| card_candidate(card, ctx))
            .collect()
    }
}

fn is_card(element: ElementRef<'_>) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_ascii_lowercase();
        CARD_CLASS_FRAGMENTS.iter().any(|f| class.contains(f))
    })
}

fn card_candidate(card: ElementRef<'_>, ctx: &ExtractionContext) -> Option<ExtractionCandidate> {
    let mut found: Option<ExtractionCandidate> = None;

    // The card element itself may be the link.
    let own_link = (card.value().name() == "a").then_some(card);
    for link in own_link.into_iter().chain(card.select(&LINKS)) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(candidate) = ctx.candidate(href, "") else {
            continue;
        };
        match &found {
            None => found = Some(candidate),
            Some(existing) if existing.source_url == candidate.source_url => {}
            Some(_) => return None,
        }
    }

    let mut candidate = found?;
    candidate.name = card_name(card).unwrap_or_default();
    Some(candidate)
}

/// Heading, then name/title-classed element, then image alt, then link text.
fn card_name(card: ElementRef<'_>) -> Option<String> {
    let first_text = |selector: &Selector| {
        card.select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    };

    first_text(&HEADINGS)
        .or_else(|| first_text(&NAMED))
        .or_else(|| {
            card.select(&IMG_ALT)
                .filter_map(|img| img.value().attr("alt"))
                .map(crate::normalize::clean_text)
                .find(|alt| !alt.is_empty())
        })
        .or_else(|| Some(element_text(card)).filter(|text| !text.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{brands_ctx, doc, items_ctx};
    use super::*;

    #[test]
    fn reads_name_from_card_heading() {
        let html = r#"
            <div class="brand-card">
              <a href="/tobaccos/darkside"><img src="/d.png" alt="logo"></a>
              <h3 class="brand-card__title">Darkside</h3>
              <a href="/tobaccos/darkside">Open</a>
            </div>
        "#;
        let out = CardClassStrategy.extract(&doc(html), &brands_ctx());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Darkside");
        assert_eq!(out[0].slug, "darkside");
        assert_eq!(out[0].source_url, "https://htreviews.org/tobaccos/darkside");
    }

    #[test]
    fn skips_containers_with_many_links() {
        let html = r#"
            <section class="catalog-grid">
              <a href="/tobaccos/darkside">Darkside</a>
              <a href="/tobaccos/musthave">Must Have</a>
            </section>
        "#;
        assert!(CardClassStrategy.extract(&doc(html), &brands_ctx()).is_empty());
    }

    #[test]
    fn anchor_card_uses_image_alt() {
        let html = r#"<a class="product-tile" href="/tobaccos/darkside/core/pinkman"><img alt="Pinkman" src="x.png"></a>"#;
        let out = CardClassStrategy.extract(&doc(html), &items_ctx("darkside"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Pinkman");
        assert_eq!(out[0].slug, "core-pinkman");
    }

    #[test]
    fn ignores_cards_linking_elsewhere() {
        let html = r#"<div class="news-card"><a href="/articles/1"><h2>News</h2></a></div>"#;
        assert!(CardClassStrategy.extract(&doc(html), &brands_ctx()).is_empty());
    }
}
