mod burton;
mod default;
mod mervin;

use models::ManufacturerKey;

use crate::{BoardIdentity, BoardSignal};

/// Normalize one scraped title with the strategy for its manufacturer.
pub fn identify(signal: &BoardSignal) -> BoardIdentity {
    match signal.manufacturer {
        ManufacturerKey::Burton => burton::identify(signal),
        ManufacturerKey::Mervin => mervin::identify(signal),
        ManufacturerKey::Default => default::identify(signal),
    }
}

#[cfg(test)]
pub(crate) fn test_signal(
    raw_model: &str,
    brand: &str,
    manufacturer: ManufacturerKey,
    profile: Option<&str>,
) -> BoardSignal {
    BoardSignal {
        raw_model: raw_model.to_string(),
        canonical_brand: brand.to_string(),
        manufacturer,
        source: models::SourceId::retailer("test"),
        source_url: None,
        profile: profile.map(str::to_string),
        gender: None,
    }
}
