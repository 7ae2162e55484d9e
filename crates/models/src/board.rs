use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AbilityLevel, BoardKey, Category, Gender, Profile, Shape};

/// Suitability scores per terrain, each in 0..=3. Scores come either from a
/// source's own `terrain_*` fields or are derived from the board's category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainScores {
    pub piste: Option<u8>,
    pub powder: Option<u8>,
    pub park: Option<u8>,
    pub freeride: Option<u8>,
    pub freestyle: Option<u8>,
}

impl TerrainScores {
    /// Field-name/value pairs in declaration order, for provenance rows and
    /// column mapping.
    pub fn fields(&self) -> [(&'static str, Option<u8>); 5] {
        [
            ("piste", self.piste),
            ("powder", self.powder),
            ("park", self.park),
            ("freeride", self.freeride),
            ("freestyle", self.freestyle),
        ]
    }

    pub fn set(&mut self, field: &str, value: u8) {
        match field {
            "piste" => self.piste = Some(value),
            "powder" => self.powder = Some(value),
            "park" => self.park = Some(value),
            "freeride" => self.freeride = Some(value),
            "freestyle" => self.freestyle = Some(value),
            _ => (),
        }
    }
}

/// A canonical physical board model, unique within `(brand, model, gender)`.
/// Specs start out null on a freshly coalesced board and are filled by the
/// resolver from `spec_sources` provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub board_key: BoardKey,
    pub brand: String,
    pub model: String,
    pub gender: Gender,
    pub year: Option<i32>,
    pub flex: Option<f64>,
    pub profile: Option<Profile>,
    pub shape: Option<Shape>,
    pub category: Option<Category>,
    pub ability_level_min: Option<AbilityLevel>,
    pub ability_level_max: Option<AbilityLevel>,
    pub terrain_scores: TerrainScores,
    pub msrp_usd: Option<f64>,
    pub manufacturer_url: Option<String>,
    pub description: Option<String>,
    pub beginner_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// A skeletal board with every spec unset, as emitted by coalescence.
    pub fn skeletal(brand: String, model: String, gender: Gender, now: DateTime<Utc>) -> Board {
        let board_key = BoardKey::new(&brand, &model, gender);
        Board {
            board_key,
            brand,
            model,
            gender,
            year: None,
            flex: None,
            profile: None,
            shape: None,
            category: None,
            ability_level_min: None,
            ability_level_max: None,
            terrain_scores: TerrainScores::default(),
            msrp_usd: None,
            manufacturer_url: None,
            description: None,
            beginner_score: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skeletal_board_key_matches_components() {
        let board = Board::skeletal(
            "Burton".to_string(),
            "Custom".to_string(),
            Gender::Unisex,
            Utc::now(),
        );
        assert_eq!(board.board_key.as_str(), "burton|custom|unisex");
        assert_eq!(board.flex, None);
        assert_eq!(board.terrain_scores, TerrainScores::default());
    }

    #[test]
    fn terrain_set_ignores_unknown_fields() {
        let mut scores = TerrainScores::default();
        scores.set("powder", 3);
        scores.set("halfpipe", 2);
        assert_eq!(scores.powder, Some(3));
        assert_eq!(scores.fields().iter().filter(|(_, v)| v.is_some()).count(), 1);
    }
}
