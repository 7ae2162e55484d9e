use models::{Category, TerrainScores};

/// Terrain suitability derived from a board's category, written as
/// provenance whenever a source reports no terrain scores of its own.
/// Scores are 0..=3.
pub fn terrain_for_category(category: Category) -> TerrainScores {
    let (piste, powder, park, freeride, freestyle) = match category {
        Category::AllMountain => (3, 1, 2, 2, 2),
        Category::Freestyle => (2, 0, 3, 1, 3),
        Category::Park => (1, 0, 3, 0, 3),
        Category::Freeride => (2, 2, 1, 3, 1),
        Category::Powder => (1, 3, 0, 3, 0),
    };
    TerrainScores {
        piste: Some(piste),
        powder: Some(powder),
        park: Some(park),
        freeride: Some(freeride),
        freestyle: Some(freestyle),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_scores_every_terrain() {
        for category in Category::iter() {
            let scores = terrain_for_category(category);
            for (field, value) in scores.fields() {
                let value = value.unwrap_or_else(|| panic!("{category} missing {field}"));
                assert!(value <= 3, "{category} {field}");
            }
        }
    }

    #[test]
    fn categories_emphasize_their_own_terrain() {
        assert_eq!(terrain_for_category(Category::Powder).powder, Some(3));
        assert_eq!(terrain_for_category(Category::Park).park, Some(3));
        assert_eq!(terrain_for_category(Category::Freeride).freeride, Some(3));
        assert_eq!(terrain_for_category(Category::AllMountain).piste, Some(3));
    }
}
