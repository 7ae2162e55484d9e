use serde::{Deserialize, Serialize};

/// Bend profile of a board, reduced to the five families that sources
/// actually report. Brand-specific marketing names ("Flying V", "C2x",
/// "PurePop") are collapsed into these by the normalizers.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Profile {
    Camber,
    Rocker,
    Flat,
    HybridCamber,
    HybridRocker,
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Shape {
    TrueTwin,
    DirectionalTwin,
    Directional,
    Tapered,
}

/// Riding category. Declaration order is meaningful: keyword-scan ties are
/// broken by the first declared variant.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    AllMountain,
    Freestyle,
    Freeride,
    Powder,
    Park,
}

/// Rider ability. Ordered so that ranges can be expressed as `min..=max`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AbilityLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// An inclusive ability range. Either bound may be absent when a source
/// names only one end ("intermediate and up") or nothing at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRange {
    pub min: Option<AbilityLevel>,
    pub max: Option<AbilityLevel>,
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
pub enum Gender {
    Unisex,
    Womens,
    Mens,
    Kids,
}

impl Gender {
    /// The gender tag used inside a `BoardKey`. Men's boards collapse into
    /// unisex, and kids/youth share a single tag.
    pub fn key_tag(&self) -> &'static str {
        match self {
            Gender::Unisex | Gender::Mens => "unisex",
            Gender::Womens => "womens",
            Gender::Kids => "kids",
        }
    }
}

/// Which identification strategy applies to a brand. Most brands use the
/// default strategy; Burton and the Mervin group (GNU, Lib Tech) carry
/// enough naming idiosyncrasy to warrant their own.
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
pub enum ManufacturerKey {
    Burton,
    Mervin,
    Default,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_strings_round_trip() {
        for (profile, wire) in [
            (Profile::Camber, "camber"),
            (Profile::HybridCamber, "hybrid_camber"),
            (Profile::HybridRocker, "hybrid_rocker"),
        ] {
            assert_eq!(profile.to_string(), wire);
            assert_eq!(wire.parse::<Profile>().unwrap(), profile);
        }

        assert_eq!(Shape::TrueTwin.to_string(), "true_twin");
        assert_eq!(Category::AllMountain.to_string(), "all_mountain");
        assert_eq!(
            "directional_twin".parse::<Shape>().unwrap(),
            Shape::DirectionalTwin
        );
    }

    #[test]
    fn ability_levels_are_ordered() {
        assert!(AbilityLevel::Beginner < AbilityLevel::Intermediate);
        assert!(AbilityLevel::Advanced < AbilityLevel::Expert);
    }

    #[test]
    fn gender_key_tags_collapse() {
        assert_eq!(Gender::Mens.key_tag(), "unisex");
        assert_eq!(Gender::Unisex.key_tag(), "unisex");
        assert_eq!(Gender::Womens.key_tag(), "womens");
        assert_eq!(Gender::Kids.key_tag(), "kids");
    }
}
