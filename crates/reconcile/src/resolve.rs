use std::collections::BTreeMap;

use models::{
    AbilityLevel, Category, Profile, Shape, SourceId, SourceKind, TerrainScores,
};
use store::SpecSourceRow;

/// The outcome of resolving one field across its provenance rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResolution {
    pub resolved: Option<String>,
    pub resolved_source: Option<SourceId>,
    /// True when every source agreed (after normalization).
    pub agreement: bool,
    pub sources: Vec<SourceId>,
}

/// Resolved specs for one board, ready to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSpecs {
    pub flex: Option<f64>,
    pub profile: Option<Profile>,
    pub shape: Option<Shape>,
    pub category: Option<Category>,
    pub ability_min: Option<AbilityLevel>,
    pub ability_max: Option<AbilityLevel>,
    pub terrain: TerrainScores,
}

/// Resolve one field. Rows are normalized, sorted by source priority
/// (manufacturer > review-site/judgment > retailer > llm), and the top row
/// wins. Consensus among independent sources is detected so that a
/// manufacturer-vs-consensus disagreement can be observed; the historical
/// adjudication step is a no-op here and the priority winner stands.
pub fn resolve_field(field: &str, rows: &[SpecSourceRow]) -> FieldResolution {
    if rows.is_empty() {
        return FieldResolution {
            resolved: None,
            resolved_source: None,
            agreement: false,
            sources: Vec::new(),
        };
    }

    let mut normalized: Vec<(SourceId, String)> = rows
        .iter()
        .map(|row| (row.source.clone(), normalize_value(field, &row.value)))
        .collect();
    // Priority descending; source id ascending keeps ties deterministic.
    normalized.sort_by(|(a, _), (b, _)| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.as_str().cmp(b.as_str()))
    });

    let (top_source, top_value) = normalized[0].clone();
    let agreement = normalized.iter().all(|(_, value)| *value == top_value);

    // Consensus: a value backed by at least two distinct sources that are
    // neither manufacturer, llm, nor judgment.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (source, value) in &normalized {
        if !consensus_excluded(source) {
            *counts.entry(value.as_str()).or_default() += 1;
        }
    }
    let consensus = counts
        .iter()
        .filter(|(_, count)| **count >= 2)
        .max_by_key(|(_, count)| **count)
        .map(|(value, _)| value.to_string());

    if let Some(consensus_value) = &consensus {
        let manufacturer = normalized
            .iter()
            .find(|(source, _)| source.kind() == SourceKind::Manufacturer);
        if let Some((source, value)) = manufacturer {
            if value != consensus_value {
                // Hook for adjudication; recorded and deliberately not acted on.
                tracing::debug!(
                    field,
                    manufacturer = %source,
                    manufacturer_value = %value,
                    consensus_value = %consensus_value,
                    "manufacturer disagrees with retail consensus"
                );
            }
        }
    }

    FieldResolution {
        resolved: Some(top_value),
        resolved_source: Some(top_source),
        agreement,
        sources: normalized.into_iter().map(|(source, _)| source).collect(),
    }
}

fn consensus_excluded(source: &SourceId) -> bool {
    matches!(
        source.kind(),
        SourceKind::Manufacturer | SourceKind::Llm | SourceKind::Judgment
    )
}

/// Values are compared and emitted in normalized form: flex rounds to the
/// nearest integer, enum fields collapse to their wire strings, everything
/// else folds case.
fn normalize_value(field: &str, value: &str) -> String {
    match field {
        "flex" => match normalize::normalize_flex(value) {
            Some(flex) => (flex.round() as i64).to_string(),
            None => value.trim().to_lowercase(),
        },
        "profile" => normalize::normalize_profile(value)
            .map(|p| p.to_string())
            .unwrap_or_else(|| value.trim().to_lowercase()),
        "shape" => normalize::normalize_shape(value)
            .map(|s| s.to_string())
            .unwrap_or_else(|| value.trim().to_lowercase()),
        "category" => normalize::normalize_category(value)
            .map(|c| c.to_string())
            .unwrap_or_else(|| value.trim().to_lowercase()),
        _ => value.trim().to_lowercase(),
    }
}

/// Resolve every field of one board from its provenance rows. Pure: the
/// same rows always produce the same specs.
pub fn resolve_board(rows: &[SpecSourceRow]) -> ResolvedSpecs {
    let mut by_field: BTreeMap<&str, Vec<SpecSourceRow>> = BTreeMap::new();
    for row in rows {
        by_field.entry(row.field.as_str()).or_default().push(row.clone());
    }

    let resolved_value = |field: &str| -> Option<String> {
        by_field
            .get(field)
            .map(|rows| resolve_field(field, rows))
            .and_then(|resolution| resolution.resolved)
    };

    let mut specs = ResolvedSpecs {
        flex: resolved_value("flex").and_then(|v| v.parse().ok()),
        profile: resolved_value("profile").and_then(|v| v.parse().ok()),
        shape: resolved_value("shape").and_then(|v| v.parse().ok()),
        category: resolved_value("category").and_then(|v| v.parse().ok()),
        ..Default::default()
    };

    if let Some(ability) = resolved_value("abilityLevel") {
        let range = normalize::normalize_ability_range(&ability);
        specs.ability_min = range.min;
        specs.ability_max = range.max;
    }

    for (terrain, _) in TerrainScores::default().fields() {
        if let Some(value) = resolved_value(&format!("terrain_{terrain}")) {
            if let Ok(score) = value.parse::<u8>() {
                specs.terrain.set(terrain, score.min(3));
            }
        }
    }

    specs
}

impl ResolvedSpecs {
    /// Apply to a board, leaving identity fields untouched.
    pub fn apply(&self, board: &mut models::Board) {
        board.flex = self.flex;
        board.profile = self.profile;
        board.shape = self.shape;
        board.category = self.category;
        board.ability_level_min = self.ability_min;
        board.ability_level_max = self.ability_max;
        board.terrain_scores = self.terrain;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use models::{BoardKey, Gender};

    fn row(field: &str, source: &str, value: &str) -> SpecSourceRow {
        SpecSourceRow {
            board_key: BoardKey::new("Burton", "Custom", Gender::Unisex),
            field: field.to_string(),
            source: SourceId::from_raw(source),
            value: value.to_string(),
            source_url: None,
            ts: Utc::now(),
        }
    }

    #[test]
    fn flex_consensus_rounds_to_integers() {
        let rows = vec![
            row("flex", "retailer:evo", "4.5"),
            row("flex", "retailer:rei", "5"),
        ];
        let resolution = resolve_field("flex", &rows);
        assert_eq!(resolution.resolved.as_deref(), Some("5"));
        assert!(resolution.agreement);
    }

    #[test]
    fn manufacturer_outranks_everyone() {
        let rows = vec![
            row("profile", "retailer:evo", "rocker"),
            row("profile", "retailer:rei", "rocker"),
            row("profile", "manufacturer:burton", "camber"),
        ];
        let resolution = resolve_field("profile", &rows);
        assert_eq!(resolution.resolved.as_deref(), Some("camber"));
        assert_eq!(
            resolution.resolved_source,
            Some(SourceId::from_raw("manufacturer:burton"))
        );
        assert!(!resolution.agreement);
    }

    #[test]
    fn review_site_outranks_retailers_but_not_manufacturer() {
        let rows = vec![
            row("shape", "retailer:evo", "true twin"),
            row("shape", "review-site:the-good-ride", "directional twin"),
        ];
        let resolution = resolve_field("shape", &rows);
        assert_eq!(resolution.resolved.as_deref(), Some("directional_twin"));
    }

    #[test]
    fn llm_rows_rank_below_retailers() {
        let rows = vec![
            row("category", "llm", "powder"),
            row("category", "retailer:evo", "freeride"),
        ];
        let resolution = resolve_field("category", &rows);
        assert_eq!(resolution.resolved.as_deref(), Some("freeride"));
    }

    #[test]
    fn empty_rows_resolve_to_nothing() {
        let resolution = resolve_field("flex", &[]);
        assert_eq!(resolution.resolved, None);
        assert_eq!(resolution.resolved_source, None);
        assert!(!resolution.agreement);
    }

    #[test]
    fn agreement_is_after_normalization() {
        let rows = vec![
            row("profile", "retailer:evo", "Hybrid Camber"),
            row("profile", "retailer:rei", "hybrid_camber"),
            row("profile", "retailer:tactics", "C2"),
        ];
        let resolution = resolve_field("profile", &rows);
        assert!(resolution.agreement);
        assert_eq!(resolution.resolved.as_deref(), Some("hybrid_camber"));
    }

    #[test]
    fn resolve_board_fills_every_spec_family() {
        let rows = vec![
            row("flex", "retailer:evo", "6"),
            row("profile", "manufacturer:burton", "camber"),
            row("shape", "retailer:evo", "directional twin"),
            row("category", "retailer:evo", "all mountain"),
            row("abilityLevel", "review-site:the-good-ride", "intermediate-expert"),
            row("terrain_piste", "retailer:evo", "3"),
            row("terrain_powder", "retailer:evo", "1"),
        ];
        let specs = resolve_board(&rows);
        assert_eq!(specs.flex, Some(6.0));
        assert_eq!(specs.profile, Some(Profile::Camber));
        assert_eq!(specs.shape, Some(Shape::DirectionalTwin));
        assert_eq!(specs.category, Some(Category::AllMountain));
        assert_eq!(specs.ability_min, Some(AbilityLevel::Intermediate));
        assert_eq!(specs.ability_max, Some(AbilityLevel::Expert));
        assert_eq!(specs.terrain.piste, Some(3));
        assert_eq!(specs.terrain.powder, Some(1));
        assert_eq!(specs.terrain.park, None);
    }

    #[test]
    fn resolver_is_deterministic_under_row_order() {
        let forward = vec![
            row("flex", "retailer:evo", "4.5"),
            row("flex", "retailer:rei", "5"),
            row("flex", "retailer:tactics", "7"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(resolve_field("flex", &forward), resolve_field("flex", &reversed));
    }
}
