use models::Profile;

use crate::fold;

/// Brand-specific profile names, matched exactly against the folded input.
/// Mervin contour codes, Burton bend names, and the common marketing
/// variants all collapse into the five profile families.
const EXACT: &[(&str, Profile)] = &[
    // Plain families.
    ("camber", Profile::Camber),
    ("rocker", Profile::Rocker),
    ("flat", Profile::Flat),
    ("hybrid camber", Profile::HybridCamber),
    ("hybrid rocker", Profile::HybridRocker),
    ("hybrid", Profile::HybridCamber),
    // Camber variants.
    ("full camber", Profile::Camber),
    ("traditional camber", Profile::Camber),
    ("positive camber", Profile::Camber),
    ("directional camber", Profile::Camber),
    ("camber dominant", Profile::Camber),
    ("freestyle camber", Profile::Camber),
    ("twin camber", Profile::Camber),
    // Rocker variants.
    ("reverse camber", Profile::Rocker),
    ("full rocker", Profile::Rocker),
    ("continuous rocker", Profile::Rocker),
    ("catch free rocker", Profile::Rocker),
    ("banana", Profile::HybridRocker),
    // Flat variants.
    ("flat top", Profile::Flat),
    ("flat-top", Profile::Flat),
    ("zero camber", Profile::Flat),
    ("flat to rocker", Profile::Flat),
    ("flat out", Profile::Flat),
    // Mervin contour codes.
    ("c2", Profile::HybridCamber),
    ("c2x", Profile::HybridCamber),
    ("c2e", Profile::HybridCamber),
    ("c3", Profile::Camber),
    ("c3 btx", Profile::Camber),
    ("btx", Profile::HybridRocker),
    ("camrock", Profile::HybridCamber),
    // Burton bends.
    ("flying v", Profile::HybridRocker),
    ("purepop camber", Profile::HybridCamber),
    ("purepop", Profile::HybridCamber),
    ("pure pop camber", Profile::HybridCamber),
    // Other brands' marketing names.
    ("camber house", Profile::Camber),
    ("cam-out camber", Profile::Camber),
    ("all camber", Profile::Camber),
    ("directional rocker", Profile::Rocker),
    ("powder rocker", Profile::Rocker),
    ("hybrid camber profile", Profile::HybridCamber),
    ("rock out camber", Profile::HybridCamber),
    ("gullwing", Profile::HybridRocker),
    ("mountain v", Profile::HybridRocker),
    ("lock and load camber", Profile::HybridCamber),
    ("double rocker", Profile::Rocker),
    ("triple base", Profile::Flat),
    ("bi-rad", Profile::Flat),
    ("freestyle flat", Profile::Flat),
    ("park v", Profile::HybridRocker),
    ("directional flat", Profile::Flat),
    ("s-rocker", Profile::Rocker),
    ("micro camber", Profile::Camber),
    ("mid camber", Profile::Camber),
    ("low camber", Profile::Camber),
];

/// Normalize a free-form profile string.
///
/// Exact alias lookup first; then the hybrid rule (both `rocker` and
/// `camber` present resolves by whichever appears first); then bare
/// substring presence of `camber`, `rocker`, `flat`, in that order.
pub fn normalize_profile(raw: &str) -> Option<Profile> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }

    if let Some((_, profile)) = EXACT.iter().find(|(alias, _)| *alias == folded) {
        return Some(*profile);
    }

    let rocker_at = folded.find("rocker");
    let camber_at = folded.find("camber");
    match (rocker_at, camber_at) {
        (Some(r), Some(c)) if r < c => return Some(Profile::HybridRocker),
        (Some(_), Some(_)) => return Some(Profile::HybridCamber),
        _ => (),
    }

    if camber_at.is_some() {
        Some(Profile::Camber)
    } else if rocker_at.is_some() {
        Some(Profile::Rocker)
    } else if folded.contains("flat") {
        Some(Profile::Flat)
    } else {
        None
    }
}
