use crate::pipeline;
use crate::{BoardIdentity, BoardSignal};

/// Burton bend names, longest first so "PurePop Camber" is taken whole
/// rather than as a trailing "Camber".
const BEND_SUFFIXES: &[&str] = &["purepop camber", "flying v", "flat top", "purepop", "camber"];

const MODEL_ALIASES: &[(&str, &str)] = &[("fish 3d directional", "3D Fish Directional")];

pub fn identify(signal: &BoardSignal) -> BoardIdentity {
    let mut model = pipeline::pre_normalize(&signal.raw_model, &signal.canonical_brand);
    let mut variant = None;

    if let Some((stripped, code)) = pipeline::strip_code_suffix(&model, BEND_SUFFIXES) {
        model = stripped;
        variant = Some(code);
    }

    if let Some((_, to)) = MODEL_ALIASES
        .iter()
        .find(|(from, _)| model.eq_ignore_ascii_case(from))
    {
        model = (*to).to_string();
    }
    if let Some(rest) = pipeline::strip_prefix_token(&model, "snowboards ") {
        model = rest;
    }

    BoardIdentity {
        model: pipeline::post_normalize(&model),
        profile_variant: variant,
    }
}
