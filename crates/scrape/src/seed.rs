use async_trait::async_trait;
use chrono::Utc;
use models::{Gender, RunScope, SourceId};

use crate::{ScrapedBoard, ScrapedListing, Scraper};

/// A small, well-known set of boards used when every live scraper failed
/// and the run would otherwise be empty. Keeps the rest of the pipeline
/// exercisable offline.
pub fn seed_boards() -> Vec<ScrapedBoard> {
    let now = Utc::now();
    let mut boards = Vec::new();

    let mut custom = ScrapedBoard::new(
        SourceId::retailer("demo"),
        "Burton",
        "Burton Custom Camber Snowboard 2026",
    );
    custom.flex = Some("6/10".to_string());
    custom.profile = Some("Camber".to_string());
    custom.shape = Some("Directional Twin".to_string());
    custom.category = Some("All-Mountain".to_string());
    custom.ability_level = Some("Intermediate-Expert".to_string());
    custom.msrp_usd = Some(639.95);
    custom.source_url = Some("https://demo.invalid/burton-custom-camber".to_string());
    custom.listings = vec![ScrapedListing {
        length_cm: Some(154.0),
        original_price: Some(639.95),
        sale_price: Some(511.96),
        availability: Some("in stock".to_string()),
        scraped_at: now,
        ..ScrapedListing::new("https://demo.invalid/burton-custom-camber-154", "USD")
    }];
    boards.push(custom);

    let mut ladies_choice = ScrapedBoard::new(
        SourceId::retailer("demo"),
        "GNU",
        "GNU Asym Ladies Choice C2X Snowboard - Women's 2025",
    );
    ladies_choice.flex = Some("Medium".to_string());
    ladies_choice.category = Some("Freestyle".to_string());
    ladies_choice.gender = Some(Gender::Womens);
    ladies_choice.source_url = Some("https://demo.invalid/gnu-ladies-choice".to_string());
    ladies_choice.listings = vec![ScrapedListing {
        length_cm: Some(145.5),
        original_price: Some(599.95),
        sale_price: Some(419.96),
        availability: Some("low stock".to_string()),
        gender: Some(Gender::Womens),
        scraped_at: now,
        ..ScrapedListing::new("https://demo.invalid/gnu-ladies-choice-1455", "USD")
    }];
    boards.push(ladies_choice);

    let mut doa = ScrapedBoard::new(SourceId::retailer("demo"), "CAPiTA", "D.O.A. Snowboard");
    doa.flex = Some("5.5/10".to_string());
    doa.profile = Some("Hybrid Camber".to_string());
    doa.shape = Some("True Twin".to_string());
    doa.category = Some("All-Mountain".to_string());
    doa.source_url = Some("https://demo.invalid/capita-doa".to_string());
    doa.listings = vec![ScrapedListing {
        length_cm: Some(156.0),
        original_price: Some(529.95),
        sale_price: Some(529.95),
        availability: Some("in stock".to_string()),
        scraped_at: now,
        ..ScrapedListing::new("https://demo.invalid/capita-doa-156", "USD")
    }];
    boards.push(doa);

    boards
}

/// The demo fallback as a registry citizen, so an offline run can still be
/// scoped and exercised end to end.
pub struct SeedScraper;

#[async_trait]
impl Scraper for SeedScraper {
    fn name(&self) -> &str {
        "demo"
    }

    fn source(&self) -> SourceId {
        SourceId::retailer("demo")
    }

    fn region(&self) -> &str {
        "us"
    }

    async fn scrape(&self, _scope: &RunScope) -> anyhow::Result<Vec<ScrapedBoard>> {
        Ok(seed_boards())
    }
}
