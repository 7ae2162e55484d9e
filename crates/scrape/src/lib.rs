//! The scraper surface: the records scrapers emit, the trait per-site
//! adapters implement, registry filtering by run scope, and the shared
//! JSON-LD product extraction helper.

mod jsonld;
mod record;
mod registry;
mod seed;

pub use jsonld::{extract_product, ProductData};
pub use record::{ScrapedBoard, ScrapedListing};
pub use registry::select;
pub use seed::{seed_boards, SeedScraper};

use async_trait::async_trait;
use models::{RunScope, SourceId};

/// An adapter for one site. Implementations fetch and parse; everything
/// downstream (identification, coalescence, resolution) is uniform.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Unique scraper name, used for exact-name scope selection.
    fn name(&self) -> &str;

    /// The provenance identifier stamped on every record this scraper
    /// emits, e.g. `retailer:tactics`.
    fn source(&self) -> SourceId;

    /// Region served, e.g. `us` or `kr`.
    fn region(&self) -> &str;

    async fn scrape(&self, scope: &RunScope) -> anyhow::Result<Vec<ScrapedBoard>>;
}

/// Lifecycle of one scraper within a run. Failure is never fatal to the
/// pipeline; the completed set still produces a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScrapeState {
    Pending,
    Running,
    Completed,
    Failed,
}
