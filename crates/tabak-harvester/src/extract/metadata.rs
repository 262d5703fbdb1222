use scraper::Html;

use super::{ExtractionCandidate, ExtractionContext, Strategy};
use crate::structured::{for_each_object, json_ld_blocks, str_field};

/// JSON-LD objects (`ItemList` elements, `Brand`/`Product` nodes, `@graph`
/// members) carrying both a catalog URL and a name.
pub struct StructuredDataStrategy;

impl Strategy for StructuredDataStrategy {
    fn name(&self) -> &'static str {
        "structured-data"
    }

    fn extract(&self, doc: &Html, ctx: &ExtractionContext) -> Vec<ExtractionCandidate> {
        let mut out = Vec::new();
        for block in json_ld_blocks(doc) {
            for_each_object(&block, &mut |map| {
                let Some(name) = str_field(map, "name") else {
                    return;
                };
                let href = str_field(map, "url")
                    .or_else(|| str_field(map, "@id"))
                    .or_else(|| str_field(map, "item"));
                if let Some(candidate) = href.and_then(|href| ctx.candidate(href, name)) {
                    out.push(candidate);
                }
            });
        }
        out
    }
}
