use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use identify::BrandIdentifier;
use models::{Gender, SourceId};

/// One record per (source, board model): the board-level fields a source
/// reported, plus its retail listings. Non-retailer sources (manufacturers,
/// review sites) emit empty listing vectors.
#[derive(Debug, Clone)]
pub struct ScrapedBoard {
    pub source: SourceId,
    /// Region of the emitting scraper, stamped onto listings.
    pub region: String,
    pub brand_id: BrandIdentifier,
    /// The source's display model name, before identification.
    pub model: String,
    pub raw_model: String,
    pub year: Option<i32>,
    // Free-form spec strings as the source printed them; the coalescer
    // normalizes and records provenance per field.
    pub flex: Option<String>,
    pub profile: Option<String>,
    pub shape: Option<String>,
    pub category: Option<String>,
    pub ability_level: Option<String>,
    pub gender: Option<Gender>,
    pub msrp_usd: Option<f64>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    /// Any additional labeled fields the source exposed.
    pub extras: BTreeMap<String, String>,
    pub listings: Vec<ScrapedListing>,
}

impl ScrapedBoard {
    pub fn new(source: SourceId, brand: impl Into<String>, raw_model: impl Into<String>) -> Self {
        let raw_model = raw_model.into();
        ScrapedBoard {
            source,
            region: "us".to_string(),
            brand_id: BrandIdentifier::new(brand),
            model: raw_model.clone(),
            raw_model,
            year: None,
            flex: None,
            profile: None,
            shape: None,
            category: None,
            ability_level: None,
            gender: None,
            msrp_usd: None,
            description: None,
            source_url: None,
            extras: BTreeMap::new(),
            listings: Vec::new(),
        }
    }
}

/// One observed offer: a size of a board at a price on one page.
#[derive(Debug, Clone)]
pub struct ScrapedListing {
    pub url: String,
    pub image_url: Option<String>,
    pub length_cm: Option<f64>,
    pub width_mm: Option<f64>,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub currency: String,
    /// Free-form availability text; normalized downstream.
    pub availability: Option<String>,
    pub condition: Option<String>,
    pub stock_count: Option<i64>,
    pub scraped_at: DateTime<Utc>,
    pub gender: Option<Gender>,
    /// What else a combo listing bundles, when the title named bindings or
    /// boots alongside the board.
    pub combo_contents: Option<String>,
}

impl ScrapedListing {
    pub fn new(url: impl Into<String>, currency: impl Into<String>) -> ScrapedListing {
        ScrapedListing {
            url: url.into(),
            image_url: None,
            length_cm: None,
            width_mm: None,
            original_price: None,
            sale_price: None,
            currency: currency.into(),
            availability: None,
            condition: None,
            stock_count: None,
            scraped_at: Utc::now(),
            gender: None,
            combo_contents: None,
        }
    }
}
