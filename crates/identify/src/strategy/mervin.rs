use crate::pipeline;
use crate::{BoardIdentity, BoardSignal};

/// Mervin contour codes, longest first. A bare trailing "Camber" is the C3
/// contour under another name.
const CONTOUR_SUFFIXES: &[&str] = &["c3 btx", "c2x", "c2e", "c2", "c3", "btx", "camber"];

const GNU_RIDERS: &[&str] = &["Forest Bailey", "Max Warbington", "Cummins'"];
const LIB_TECH_RIDERS: &[&str] = &["T. Rice", "Travis Rice"];

pub fn identify(signal: &BoardSignal) -> BoardIdentity {
    let is_lib_tech = signal.canonical_brand.eq_ignore_ascii_case("lib tech");
    let is_gnu = signal.canonical_brand.eq_ignore_ascii_case("gnu");

    let mut model = pipeline::pre_normalize(&signal.raw_model, &signal.canonical_brand);

    // "Lib Tech" stripped as a brand prefix sometimes leaves its second
    // word behind ("Tech Skate Banana").
    if is_lib_tech {
        if let Some(rest) = pipeline::strip_prefix_token(&model, "tech ") {
            model = rest;
        }
    }
    model = model.replace("T.Rice", "T. Rice");

    let mut variant = None;
    if let Some((stripped, code)) = pipeline::strip_code_suffix(&model, CONTOUR_SUFFIXES) {
        model = stripped;
        variant = Some(if code == "camber" { "c3".to_string() } else { code });
    }
    if variant.is_none() {
        if let Some(profile) = signal.profile.as_deref() {
            if !profile.trim().is_empty() {
                variant = variant_from_profile(profile);
            }
        }
    }

    let riders = if is_gnu { GNU_RIDERS } else { LIB_TECH_RIDERS };
    model = pipeline::strip_rider_names(&model, riders);

    for prefix in ["signature series ", "ltd "] {
        if let Some(rest) = pipeline::strip_prefix_token(&model, prefix) {
            model = rest;
        }
    }

    if is_gnu {
        if let Some(rest) = pipeline::strip_prefix_token(&model, "asym ") {
            model = rest;
        }
        if let Some(rest) = pipeline::strip_suffix_token(&model, " asym") {
            model = rest;
        }
        model = model.replace('-', " ");
        // A bare "C" token is the contour surfaced in the URL slug, not
        // part of the name.
        if let Some(rest) = pipeline::strip_prefix_token(&model, "c ") {
            model = rest;
        }
        if let Some(rest) = pipeline::strip_suffix_token(&model, " c") {
            model = rest;
        }
    }

    if model.eq_ignore_ascii_case("son of a birdman") {
        model = "Son of Birdman".to_string();
    }

    BoardIdentity {
        model: pipeline::post_normalize(&model),
        profile_variant: variant,
    }
}

/// When the title carries no contour code, derive one from the source's
/// profile string: explicit codes first, then profile-family names.
fn variant_from_profile(profile: &str) -> Option<String> {
    let p = profile.to_lowercase();
    for code in ["c3 btx", "c2x", "c2e", "c2", "c3", "btx"] {
        if p.contains(code) {
            return Some(code.to_string());
        }
    }
    if p.contains("hybrid camber") || p.contains("camrock") {
        Some("c2".to_string())
    } else if p.contains("hybrid rocker") || p.contains("flying v") {
        Some("btx".to_string())
    } else if p.contains("camber") {
        Some("c3".to_string())
    } else if p.contains("rocker") {
        Some("btx".to_string())
    } else {
        None
    }
}
