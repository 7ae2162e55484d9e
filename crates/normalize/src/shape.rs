use models::Shape;

use crate::fold;

const EXACT: &[(&str, Shape)] = &[
    ("true twin", Shape::TrueTwin),
    ("twin", Shape::TrueTwin),
    ("perfect twin", Shape::TrueTwin),
    ("asymmetrical twin", Shape::TrueTwin),
    ("asym twin", Shape::TrueTwin),
    ("directional twin", Shape::DirectionalTwin),
    ("twin-like directional", Shape::DirectionalTwin),
    ("directional", Shape::Directional),
    ("tapered", Shape::Tapered),
    ("tapered directional", Shape::Tapered),
    ("directional tapered", Shape::Tapered),
];

/// Normalize a free-form shape string. Exact table first, then substring
/// rules. A string naming both `twin` and `direct*` is a directional twin;
/// that test runs before the bare `twin` fallback.
pub fn normalize_shape(raw: &str) -> Option<Shape> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }

    if let Some((_, shape)) = EXACT.iter().find(|(alias, _)| *alias == folded) {
        return Some(*shape);
    }

    let twin = folded.contains("twin");
    let directional = folded.contains("direct");
    if twin && directional {
        Some(Shape::DirectionalTwin)
    } else if folded.contains("taper") {
        Some(Shape::Tapered)
    } else if twin {
        Some(Shape::TrueTwin)
    } else if directional {
        Some(Shape::Directional)
    } else {
        None
    }
}
