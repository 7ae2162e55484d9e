use models::{AbilityLevel, AbilityRange};

use crate::fold;

/// Whole-token aliases, resolved before any range splitting so hyphenated
/// aliases like `entry-level` aren't torn apart by the range delimiter.
const ALIASES: &[(&str, AbilityLevel)] = &[
    ("novice", AbilityLevel::Beginner),
    ("entry level", AbilityLevel::Beginner),
    ("entry-level", AbilityLevel::Beginner),
    ("day 1", AbilityLevel::Beginner),
    ("first timer", AbilityLevel::Beginner),
    ("first-timer", AbilityLevel::Beginner),
    ("progressing", AbilityLevel::Intermediate),
    ("experienced", AbilityLevel::Advanced),
    ("pro", AbilityLevel::Expert),
    ("pro level", AbilityLevel::Expert),
    ("pro-level", AbilityLevel::Expert),
];

fn resolve_level(token: &str) -> Option<AbilityLevel> {
    let token = token.trim();
    if let Some((_, level)) = ALIASES.iter().find(|(alias, _)| *alias == token) {
        return Some(*level);
    }
    token.parse::<AbilityLevel>().ok()
}

/// Parse a single level or a `min-max` range. Unknown input yields an empty
/// range rather than an error.
pub fn normalize_ability_range(raw: &str) -> AbilityRange {
    let folded = fold(raw);
    if folded.is_empty() {
        return AbilityRange::default();
    }

    if folded == "all levels" || folded == "all-levels" {
        return AbilityRange {
            min: Some(AbilityLevel::Beginner),
            max: Some(AbilityLevel::Expert),
        };
    }

    // A whole-string alias or level name is a degenerate range.
    if let Some(level) = resolve_level(&folded) {
        return AbilityRange {
            min: Some(level),
            max: Some(level),
        };
    }

    let parts: Vec<&str> = if folded.contains(" to ") {
        folded.splitn(2, " to ").collect()
    } else {
        folded.splitn(2, ['-', '–']).collect()
    };
    if parts.len() == 2 {
        let min = resolve_level(parts[0]);
        let max = resolve_level(parts[1]);
        if min.is_some() || max.is_some() {
            return AbilityRange { min, max };
        }
    }

    AbilityRange::default()
}
