use crate::pipeline;
use crate::{BoardIdentity, BoardSignal};

/// Signature-model rider names stripped per brand. Matching is positional,
/// the same as Mervin's: title start, title end, or infix `by <rider>`.
const RIDERS: &[(&str, &[&str])] = &[
    ("capita", &["Jess Kimura", "Arthur Longo"]),
    ("nitro", &["Marcus Kleveland"]),
    ("jones", &["Jeremy Jones"]),
    ("arbor", &["Bryan Iguchi", "Marie-France Roy"]),
    ("gentemstick", &["Taro Tamai"]),
    ("aesmo", &["Wolle Nyvelt"]),
];

const EXACT_ALIASES: &[(&str, &str)] = &[
    ("mega merc", "Mega Mercury"),
    ("hel yes", "Hell Yes"),
    ("paradice", "Paradise"),
    ("dreamweaver", "Dream Weaver"),
];

const PREFIX_ALIASES: &[(&str, &str)] = &[
    ("sb ", "Spring Break "),
    ("snowboards ", ""),
    ("darkhorse ", "Dark Horse "),
];

pub fn identify(signal: &BoardSignal) -> BoardIdentity {
    let mut model = pipeline::pre_normalize(&signal.raw_model, &signal.canonical_brand);
    let brand_key = signal.canonical_brand.to_lowercase();

    if let Some((_, riders)) = RIDERS.iter().find(|(brand, _)| *brand == brand_key) {
        model = pipeline::strip_rider_names(&model, riders);
    }

    // "Dinosaurs Will Die" stripped as a brand prefix can leave half of
    // itself behind.
    if brand_key == "dinosaurs will die" {
        for leak in ["will die ", "dinosaurs "] {
            if let Some(rest) = pipeline::strip_prefix_token(&model, leak) {
                model = rest;
                break;
            }
        }
    }

    if let Some((_, to)) = EXACT_ALIASES
        .iter()
        .find(|(from, _)| model.eq_ignore_ascii_case(from))
    {
        model = (*to).to_string();
    } else {
        for (from, to) in PREFIX_ALIASES {
            if let Some(rest) = pipeline::strip_prefix_token(&model, from) {
                model = format!("{to}{rest}");
                break;
            }
        }
    }

    // No profile variants outside Burton and Mervin.
    BoardIdentity::plain(pipeline::post_normalize(&model))
}
