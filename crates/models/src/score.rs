use crate::{AbilityLevel, Category, Profile};

/// Score how approachable a board is for a novice, 0..=100.
///
/// A weighted blend of resolved specs: flex softness (35%), ability floor
/// (30%), profile forgiveness (20%), and category (15%). A missing spec
/// contributes its component midpoint, so sparsely specified boards land
/// mid-scale rather than at either extreme.
pub fn beginner_score(
    flex: Option<f64>,
    ability_min: Option<AbilityLevel>,
    profile: Option<Profile>,
    category: Option<Category>,
) -> f64 {
    let flex_component = match flex {
        Some(f) => ((10.0 - f) / 9.0).clamp(0.0, 1.0),
        None => 0.5,
    };
    let ability_component = match ability_min {
        Some(AbilityLevel::Beginner) => 1.0,
        Some(AbilityLevel::Intermediate) => 0.65,
        Some(AbilityLevel::Advanced) => 0.25,
        Some(AbilityLevel::Expert) => 0.0,
        None => 0.5,
    };
    let profile_component = match profile {
        Some(Profile::Rocker) | Some(Profile::HybridRocker) => 1.0,
        Some(Profile::Flat) => 0.6,
        Some(Profile::HybridCamber) => 0.5,
        Some(Profile::Camber) => 0.0,
        None => 0.5,
    };
    let category_component = match category {
        Some(Category::AllMountain) | Some(Category::Freestyle) => 1.0,
        Some(Category::Park) => 0.5,
        Some(Category::Freeride) | Some(Category::Powder) => 0.0,
        None => 0.5,
    };

    let blended = 0.35 * flex_component
        + 0.30 * ability_component
        + 0.20 * profile_component
        + 0.15 * category_component;

    (blended * 100.0).round()
}
