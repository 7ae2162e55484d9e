//! The shared model-title normalization pipeline. Strategies run the
//! pre-normalization steps, apply their brand-specific rules, then finish
//! with the post-normalization steps.

use lazy_static::lazy_static;
use models::strip_zero_width;
use regex::Regex;

lazy_static! {
    // Combo listings: everything from " + ", " w/ ", or "& Binding(s)" on
    // describes the bundle, not the board.
    static ref COMBO_PLUS: Regex = Regex::new(r"\s+\+\s.*$").expect("combo regex");
    static ref COMBO_WITH: Regex = Regex::new(r"(?i)\s+w/\s.*$").expect("combo regex");
    static ref COMBO_BINDINGS: Regex =
        Regex::new(r"(?i)\s*&\s*bindings?\b.*$").expect("combo regex");
    static ref RETAIL_TAG_PAREN: Regex =
        Regex::new(r"(?i)\s*\((?:closeout|blem|sale)\)").expect("tag regex");
    static ref RETAIL_TAG_DASH: Regex =
        Regex::new(r"(?i)\s*-\s*(?:closeout|blem|sale)\b").expect("tag regex");
    static ref SNOWBOARD_WORD: Regex = Regex::new(r"(?i)\s*\bsnowboard\b").expect("word regex");
    static ref YEARS: Regex =
        Regex::new(r"\s*(?:-\s*)?\b20\d{2}(?:\s*/\s*20\d{2})?\b").expect("year regex");
    static ref EARLY_RELEASE: Regex =
        Regex::new(r"(?i)\s*\b(?:\d{4}\s+)?early\s+release\b").expect("season regex");
    // A trailing all-digit token in the plausible board-length range.
    // "4x4" contains a letter and survives; "100" is out of range.
    static ref TRAILING_SIZE: Regex =
        Regex::new(r"\s+(?:1[3-9]\d|2[0-2]\d)\s*$").expect("size regex");
    static ref GENDER_DASH_SUFFIX: Regex =
        Regex::new(r"(?i)\s*-\s*(?:women'?s|men'?s|kids'?|boys'?|girls'?|youth)\s*$")
            .expect("gender regex");
    static ref GENDER_PLAIN_SUFFIX: Regex =
        Regex::new(r"(?i)\s+(?:women'?s|men'?s|kids'?|boys'?|girls'?|youth)\s*$")
            .expect("gender regex");
    static ref GENDER_PREFIX: Regex =
        Regex::new(r"(?i)^(?:women'?s|men'?s|kids'?|boys'?|girls'?|youth)\s+")
            .expect("gender regex");
    static ref THE_PREFIX: Regex = Regex::new(r"(?i)^the\s+").expect("prefix regex");
    static ref PACKAGE_WORD: Regex = Regex::new(r"(?i)\s*\bpackage\b").expect("word regex");
}

/// Steps applied to every raw title before brand-specific rules: noise
/// characters, combo tails, retail tags, the word "Snowboard", years,
/// season suffixes, trailing sizes, gender affixes, and a leaked brand
/// prefix.
pub fn pre_normalize(raw_model: &str, canonical_brand: &str) -> String {
    let mut s = strip_zero_width(raw_model);
    s = s.replace('|', " ");
    s = COMBO_PLUS.replace(&s, "").into_owned();
    s = COMBO_WITH.replace(&s, "").into_owned();
    s = COMBO_BINDINGS.replace(&s, "").into_owned();
    s = RETAIL_TAG_PAREN.replace_all(&s, "").into_owned();
    s = RETAIL_TAG_DASH.replace_all(&s, "").into_owned();
    s = SNOWBOARD_WORD.replace_all(&s, "").into_owned();
    s = YEARS.replace_all(&s, "").into_owned();
    s = EARLY_RELEASE.replace_all(&s, "").into_owned();
    s = TRAILING_SIZE.replace(&s, "").into_owned();
    s = GENDER_DASH_SUFFIX.replace(&s, "").into_owned();
    s = GENDER_PLAIN_SUFFIX.replace(&s, "").into_owned();
    s = GENDER_PREFIX.replace(&s, "").into_owned();
    s = collapse_whitespace(&s);
    s = strip_brand_prefix(&s, canonical_brand);
    s.trim().to_string()
}

/// Steps applied after brand-specific rules: articles, dash separators,
/// initialism periods, hyphens, the "Package" keyword, and whitespace.
pub fn post_normalize(model: &str) -> String {
    let mut s = THE_PREFIX.replace(model, "").into_owned();
    s = s.replace(" - ", " ");
    s = strip_letter_periods(&s);
    s = s.replace('-', " ");
    s = PACKAGE_WORD.replace_all(&s, "").into_owned();
    let s = collapse_whitespace(&s);
    s.trim_matches(|c| c == '/' || c == '-' || c == ' ').to_string()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop periods except when sandwiched between digits, so `D.O.A.` becomes
/// `DOA` while a version number like `2.0` survives.
fn strip_letter_periods(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '.' {
            let between_digits = i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit());
            if !between_digits {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Strip the canonical brand from the front of a model when it leaks in,
/// but only on a word boundary: `Chrome Rome` with brand `Rome` is left
/// alone.
fn strip_brand_prefix(s: &str, brand: &str) -> String {
    let brand = brand.trim();
    if brand.is_empty() || s.len() <= brand.len() || !s.is_char_boundary(brand.len()) {
        return s.to_string();
    }
    if s[..brand.len()].eq_ignore_ascii_case(brand)
        && s[brand.len()..].starts_with(|c: char| c.is_whitespace())
    {
        return s[brand.len()..].trim_start().to_string();
    }
    s.to_string()
}

/// Strip the longest matching code from the end of the model, returning the
/// remainder and the (lowercase) code. Codes must sit on a word boundary.
pub fn strip_code_suffix(s: &str, codes: &[&str]) -> Option<(String, String)> {
    for code in codes {
        if s.len() <= code.len() || !s.is_char_boundary(s.len() - code.len()) {
            continue;
        }
        let at = s.len() - code.len();
        if s[at..].eq_ignore_ascii_case(code)
            && s[..at].chars().last().map_or(false, |c| c.is_whitespace())
        {
            return Some((s[..at].trim_end().to_string(), code.to_string()));
        }
    }
    None
}

pub fn strip_prefix_token(s: &str, prefix: &str) -> Option<String> {
    if s.len() > prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(s[prefix.len()..].trim_start().to_string())
    } else {
        None
    }
}

pub fn strip_suffix_token(s: &str, suffix: &str) -> Option<String> {
    if s.len() > suffix.len() && s.is_char_boundary(s.len() - suffix.len()) {
        let at = s.len() - suffix.len();
        if s[at..].eq_ignore_ascii_case(suffix) {
            return Some(s[..at].trim_end().to_string());
        }
    }
    None
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| {
        haystack.is_char_boundary(i)
            && haystack.is_char_boundary(i + needle.len())
            && haystack[i..i + needle.len()].eq_ignore_ascii_case(needle)
    })
}

/// Remove rider names at the start, the end, or in infix `by <rider>` form.
/// A name buried elsewhere in the title is left alone.
pub fn strip_rider_names(model: &str, riders: &[&str]) -> String {
    let mut s = model.to_string();
    for rider in riders {
        if let Some(rest) = strip_prefix_token(&s, &format!("{rider} ")) {
            s = rest;
            continue;
        }
        if let Some(rest) = strip_suffix_token(&s, &format!(" {rider}")) {
            s = rest;
            continue;
        }
        let infix = format!(" by {rider}");
        if let Some(at) = find_ignore_ascii_case(&s, &infix) {
            let end = at + infix.len();
            let boundary_after = s[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            if boundary_after {
                s = format!("{}{}", &s[..at], &s[end..]);
            }
        }
    }
    collapse_whitespace(&s).trim().to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pre_normalize_strips_retail_noise() {
        let table = [
            ("Custom Snowboard 2026", "Burton", "Custom"),
            ("Custom Camber Snowboard 2026", "Burton", "Custom Camber"),
            ("Burton Custom Snowboard", "Burton", "Custom"),
            ("Custom (Closeout)", "Burton", "Custom"),
            ("Custom - Blem", "Burton", "Custom"),
            ("Custom 158", "Burton", "Custom"),
            ("Custom + Cartel Bindings", "Burton", "Custom"),
            ("Custom w/ Malavita", "Burton", "Custom"),
            ("Custom & Bindings Combo", "Burton", "Custom"),
            ("Custom - Women's", "Burton", "Custom"),
            ("Women's Custom", "Burton", "Custom"),
            ("Custom 2025/2026", "Burton", "Custom"),
            ("Custom 2025 Early Release", "Burton", "Custom"),
            ("Hometown Hero|Camber", "Burton", "Hometown Hero Camber"),
        ];
        for (raw, brand, expect) in table {
            assert_eq!(pre_normalize(raw, brand), expect, "{raw}");
        }
    }

    #[test]
    fn size_strip_spares_letter_tokens_and_small_numbers() {
        assert_eq!(pre_normalize("4x4", "Rome"), "4x4");
        assert_eq!(pre_normalize("Rome 4x4 158", "Rome"), "4x4");
        assert_eq!(pre_normalize("Super 8 100", "Rome"), "Super 8 100");
        assert_eq!(pre_normalize("Agent 229", "Rome"), "Agent");
        assert_eq!(pre_normalize("Agent 230", "Rome"), "Agent 230");
    }

    #[test]
    fn brand_prefix_strip_needs_word_boundary() {
        assert_eq!(pre_normalize("Chrome Rome Snowboard", "Rome"), "Chrome Rome");
        assert_eq!(pre_normalize("Romesse", "Rome"), "Romesse");
        assert_eq!(pre_normalize("ROME Agent", "Rome"), "Agent");
    }

    #[test]
    fn post_normalize_cleanup() {
        let table = [
            ("The Huck Knife", "Huck Knife"),
            ("Party Wave - Wide", "Party Wave Wide"),
            ("D.O.A.", "DOA"),
            ("Mind Expander 2.0", "Mind Expander 2.0"),
            ("Dream-Weaver", "Dream Weaver"),
            ("Custom Package", "Custom"),
            ("Custom  /", "Custom"),
        ];
        for (raw, expect) in table {
            assert_eq!(post_normalize(raw), expect, "{raw}");
        }
    }

    #[test]
    fn code_suffix_extraction() {
        let codes = &["c3 btx", "c2x", "c2", "btx", "camber"];
        assert_eq!(
            strip_code_suffix("Ladies Choice C2X", codes),
            Some(("Ladies Choice".to_string(), "c2x".to_string()))
        );
        assert_eq!(
            strip_code_suffix("Box Knife C3 BTX", codes),
            Some(("Box Knife".to_string(), "c3 btx".to_string()))
        );
        // Not at the end: no extraction.
        assert_eq!(strip_code_suffix("Cold Brew C2 LTD", codes), None);
        // The code must be its own token.
        assert_eq!(strip_code_suffix("Magic", codes), None);
    }

    #[test]
    fn rider_stripping_positions() {
        let riders = &["Jess Kimura"];
        assert_eq!(
            strip_rider_names("Jess Kimura Equalizer", riders),
            "Equalizer"
        );
        assert_eq!(
            strip_rider_names("Equalizer Jess Kimura", riders),
            "Equalizer"
        );
        assert_eq!(
            strip_rider_names("Equalizer By Jess Kimura", riders),
            "Equalizer"
        );
        // Mid-title mention without "by" is preserved.
        assert_eq!(
            strip_rider_names("Jess Kimura's Pick", riders),
            "Jess Kimura's Pick"
        );
    }
}
