//! Review-site enrichment: a sitemap-backed fuzzy lookup from board
//! identity to review URL, and extraction of authoritative-ish specs from
//! review pages. Emits `ScrapedBoard` records with empty listings.

mod enricher;
mod extract;
mod sitemap;

pub use enricher::{ReviewSiteConfig, ReviewSiteEnricher};
pub use extract::{extract_review_specs, ReviewSpecs};
pub use sitemap::{parse_review_slug, parse_sitemap_urls, SitemapEntry};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] fetch::Error),

    #[error(transparent)]
    Store(#[from] store::Error),

    #[error("failed to decode cached sitemap: {0}")]
    SitemapCache(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Sørensen–Dice bigram similarity over lowercased alphanumerics, the
/// score behind review-URL resolution.
pub fn model_similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(&alphanumeric_fold(a), &alphanumeric_fold(b))
}

fn alphanumeric_fold(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
