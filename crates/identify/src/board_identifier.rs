use std::sync::OnceLock;

use lazy_static::lazy_static;
use models::{Condition, Gender, ManufacturerKey, SourceId};
use regex::Regex;

use crate::{identify, BoardIdentity, BoardSignal, BrandIdentifier};

lazy_static! {
    static ref FULL_YEAR: Regex = Regex::new(r"\b(20[12]\d)\b").expect("year regex");
    static ref SHORT_YEAR: Regex = Regex::new(r"\b([12]\d)\b").expect("year regex");
}

/// The raw fields a scraper observed for one listing, before any
/// interpretation.
#[derive(Debug, Clone, Default)]
pub struct ListingHints {
    pub brand: Option<String>,
    pub raw_model: String,
    pub url: Option<String>,
    pub profile: Option<String>,
    pub condition: Option<String>,
    pub gender: Option<Gender>,
    pub year: Option<i32>,
}

/// Bundles raw listing hints and lazily derives the canonical brand, model
/// identity, condition, gender, and year. Each derivation runs at most once.
#[derive(Debug)]
pub struct BoardIdentifier {
    source: SourceId,
    hints: ListingHints,
    brand: OnceLock<Option<BrandIdentifier>>,
    identity: OnceLock<BoardIdentity>,
    condition: OnceLock<Condition>,
    gender: OnceLock<Option<Gender>>,
    year: OnceLock<Option<i32>>,
}

impl BoardIdentifier {
    pub fn new(source: SourceId, hints: ListingHints) -> BoardIdentifier {
        BoardIdentifier {
            source,
            hints,
            brand: OnceLock::new(),
            identity: OnceLock::new(),
            condition: OnceLock::new(),
            gender: OnceLock::new(),
            year: OnceLock::new(),
        }
    }

    fn brand_id(&self) -> Option<&BrandIdentifier> {
        self.brand
            .get_or_init(|| BrandIdentifier::from_candidates([self.hints.brand.as_deref()]))
            .as_ref()
    }

    /// Canonical brand, or `"Unknown"` when the scraper saw none.
    pub fn brand(&self) -> &str {
        self.brand_id().map_or("Unknown", |b| b.canonical())
    }

    pub fn identity(&self) -> &BoardIdentity {
        self.identity.get_or_init(|| {
            let (canonical, manufacturer) = match self.brand_id() {
                Some(brand) => (brand.canonical().to_string(), brand.manufacturer()),
                None => (String::new(), ManufacturerKey::Default),
            };
            identify(&BoardSignal {
                raw_model: self.hints.raw_model.clone(),
                canonical_brand: canonical,
                manufacturer,
                source: self.source.clone(),
                source_url: self.hints.url.clone(),
                profile: self.hints.profile.clone(),
                gender: self.hints.gender,
            })
        })
    }

    pub fn model(&self) -> &str {
        &self.identity().model
    }

    pub fn profile_variant(&self) -> Option<&str> {
        self.identity().profile_variant.as_deref()
    }

    pub fn condition(&self) -> Condition {
        *self.condition.get_or_init(|| {
            if let Some(hint) = self.hints.condition.as_deref() {
                if let Ok(condition) = hint.trim().to_lowercase().parse::<Condition>() {
                    return condition;
                }
            }
            normalize::detect_condition(&self.hints.raw_model, self.hints.url.as_deref())
        })
    }

    pub fn gender(&self) -> Option<Gender> {
        *self.gender.get_or_init(|| {
            self.hints.gender.or_else(|| {
                normalize::detect_gender(&self.hints.raw_model, self.hints.url.as_deref())
            })
        })
    }

    /// Model year: the hint if present, else a four-digit 20xx year in the
    /// raw title, else a bare two-digit token clamped to 18..=29.
    pub fn year(&self) -> Option<i32> {
        *self.year.get_or_init(|| {
            if self.hints.year.is_some() {
                return self.hints.year;
            }
            if let Some(caps) = FULL_YEAR.captures(&self.hints.raw_model) {
                return caps[1].parse().ok();
            }
            if let Some(caps) = SHORT_YEAR.captures(&self.hints.raw_model) {
                let short: i32 = caps[1].parse().ok()?;
                if (18..=29).contains(&short) {
                    return Some(2000 + short);
                }
            }
            None
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn identifier(hints: ListingHints) -> BoardIdentifier {
        BoardIdentifier::new(SourceId::retailer("test"), hints)
    }

    #[test]
    fn derives_all_fields_from_a_noisy_title() {
        let id = identifier(ListingHints {
            brand: Some("Burton Snowboards".to_string()),
            raw_model: "Burton Custom Camber Snowboard 2026 - Women's (Blem)".to_string(),
            url: Some("https://shop.example/burton-custom-blem".to_string()),
            ..Default::default()
        });
        assert_eq!(id.brand(), "Burton");
        assert_eq!(id.model(), "Custom");
        assert_eq!(id.profile_variant(), Some("camber"));
        assert_eq!(id.condition(), Condition::Blemished);
        assert_eq!(id.gender(), Some(Gender::Womens));
        assert_eq!(id.year(), Some(2026));
    }

    #[test]
    fn hints_win_over_detection() {
        let id = identifier(ListingHints {
            brand: Some("Burton".to_string()),
            raw_model: "Custom - Women's".to_string(),
            condition: Some("closeout".to_string()),
            gender: Some(Gender::Kids),
            year: Some(2024),
            ..Default::default()
        });
        assert_eq!(id.condition(), Condition::Closeout);
        assert_eq!(id.gender(), Some(Gender::Kids));
        assert_eq!(id.year(), Some(2024));
    }

    #[test]
    fn missing_brand_is_unknown() {
        let id = identifier(ListingHints {
            raw_model: "Mystery Board".to_string(),
            ..Default::default()
        });
        assert_eq!(id.brand(), "Unknown");
        assert_eq!(id.model(), "Mystery Board");
    }

    #[test]
    fn short_year_inference_clamps() {
        let id = identifier(ListingHints {
            raw_model: "Custom 26".to_string(),
            ..Default::default()
        });
        assert_eq!(id.year(), Some(2026));

        let id = identifier(ListingHints {
            raw_model: "Custom 31".to_string(),
            ..Default::default()
        });
        assert_eq!(id.year(), None);
    }
}
