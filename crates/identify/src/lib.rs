//! Board identification: mapping noisy scraped strings to canonical
//! identities.
//!
//! A scraped title like `GNU Asym Ladies Choice C2X Snowboard - Women's
//! 2025` carries the brand, a gender tag, a model year, a contour code, and
//! retail noise on top of the model name. Whether retailer listings
//! coalesce onto the right board depends entirely on reducing such strings
//! to the same `(brand, model)` pair every time, so the rules here are
//! deliberately manufacturer-specific.

mod board_identifier;
mod brand;
mod pipeline;
mod signal;
mod strategy;

pub use board_identifier::{BoardIdentifier, ListingHints};
pub use brand::BrandIdentifier;
pub use signal::{BoardIdentity, BoardSignal};
pub use strategy::identify;
