pub mod catalog;
pub mod detail;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod navigate;
pub mod normalize;
pub mod parse_helpers;
pub mod readiness;
pub(crate) mod retry;
pub mod scroll;
pub mod session;
pub(crate) mod structured;

pub use catalog::{CatalogLink, CatalogPaths, ListingTarget};
pub use detail::{parse_detail, scrape_detail, DetailPage, EntityKind};
pub use error::HarvestError;
pub use extract::{extract_with_strategies, ExtractionCandidate, ExtractionContext, Extractor, Strategy};
pub use harvest::{BrandFailure, BrandHarvest, HarvestReport, Harvester};
pub use navigate::navigate;
pub use readiness::await_rendered_content;
pub use retry::backoff_delay;
pub use scroll::{drive_scroll, ScrollOptions, ScrollOutcome, ScrollResult};
#[cfg(feature = "browser")]
pub use session::ChromiumSession;
pub use session::{HttpSession, PageSession};
