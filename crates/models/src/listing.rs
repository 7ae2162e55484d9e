use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{BoardKey, Gender};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    InStock,
    LowStock,
    OutOfStock,
    Unknown,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Condition {
    New,
    Blemished,
    Closeout,
}

/// Deterministic listing identity: the first 16 hex characters of
/// `sha256(retailer|url|length_cm)`. An absent length contributes the empty
/// string, so the same URL with and without a size parses to distinct ids.
pub fn listing_id(retailer: &str, url: &str, length_cm: Option<f64>) -> String {
    let length = length_cm.map(|l| l.to_string()).unwrap_or_default();
    let digest = Sha256::digest(format!("{retailer}|{url}|{length}").as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// One retailer's offer of one size of a board at one price. Listings are
/// inserted fresh per search run and reference their `Board` by key only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub board_key: BoardKey,
    pub run_id: i64,
    pub retailer: String,
    pub region: String,
    pub url: String,
    pub image_url: Option<String>,
    pub length_cm: Option<f64>,
    pub width_mm: Option<f64>,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub currency: String,
    pub sale_price_usd: Option<f64>,
    pub availability: Availability,
    pub condition: Condition,
    pub gender: Gender,
    pub discount_percent: Option<i64>,
    pub stock_count: Option<i64>,
    pub combo_contents: Option<String>,
    pub scraped_at: DateTime<Utc>,
}
