use lazy_static::lazy_static;
use regex::Regex;

use crate::fold;

lazy_static! {
    // "7/10", "7 out of 10", "6.5 / 10".
    static ref OUT_OF_TEN: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:/|out of)\s*10\b").expect("flex regex");
}

/// Text ratings, compounds strictly before their prefixes: `soft-medium`
/// must match ahead of `soft`, `medium-stiff` ahead of `medium`.
const TEXT: &[(&str, f64)] = &[
    ("very soft", 2.0),
    ("very stiff", 9.0),
    ("soft-medium", 4.0),
    ("soft medium", 4.0),
    ("soft to medium", 4.0),
    ("soft/medium", 4.0),
    ("medium-soft", 4.0),
    ("medium soft", 4.0),
    ("medium-stiff", 6.0),
    ("medium stiff", 6.0),
    ("medium to stiff", 6.0),
    ("medium/stiff", 6.0),
    ("stiff-medium", 6.0),
    ("soft", 3.0),
    ("medium", 5.0),
    ("stiff", 7.0),
];

/// Normalize a free-form flex description to a 1..=10 rating.
pub fn normalize_flex(raw: &str) -> Option<f64> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }

    if let Some(caps) = OUT_OF_TEN.captures(&folded) {
        if let Ok(value) = caps[1].parse::<f64>() {
            if (1.0..=10.0).contains(&value) {
                return Some(value);
            }
        }
    }

    if let Ok(value) = folded.parse::<f64>() {
        if (1.0..=10.0).contains(&value) {
            return Some(value);
        }
        return None;
    }

    TEXT.iter()
        .find(|(phrase, _)| folded.contains(phrase))
        .map(|(_, value)| *value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn out_of_ten_ratings() {
        assert_eq!(normalize_flex("7/10"), Some(7.0));
        assert_eq!(normalize_flex("6.5 / 10"), Some(6.5));
        assert_eq!(normalize_flex("Flex: 4 out of 10"), Some(4.0));
    }

    #[test]
    fn bare_numbers() {
        assert_eq!(normalize_flex("7"), Some(7.0));
        assert_eq!(normalize_flex("4.5"), Some(4.5));
        assert_eq!(normalize_flex("0"), None);
        assert_eq!(normalize_flex("11"), None);
    }

    #[test]
    fn text_ratings() {
        let table = [
            ("Very Soft", 2.0),
            ("soft", 3.0),
            ("Soft-Medium", 4.0),
            ("medium-soft", 4.0),
            ("medium", 5.0),
            ("Medium-Stiff", 6.0),
            ("stiff", 7.0),
            ("very stiff", 9.0),
        ];
        for (raw, expect) in table {
            assert_eq!(normalize_flex(raw), Some(expect), "{raw}");
        }
    }

    #[test]
    fn compounds_beat_prefixes() {
        // "medium-stiff flex" contains "stiff", but the compound wins.
        assert_eq!(normalize_flex("medium-stiff flex"), Some(6.0));
        assert_eq!(normalize_flex("a soft-medium flex pattern"), Some(4.0));
    }

    #[test]
    fn unknown_is_none() {
        assert_eq!(normalize_flex("forgiving"), None);
        assert_eq!(normalize_flex(""), None);
    }
}
