use std::sync::OnceLock;

use models::{strip_zero_width, ManufacturerKey};

/// Company-form suffixes stripped from raw brand strings, longest first so
/// "Snowboard Co." goes before "Snowboard" and "Co".
const BRAND_SUFFIXES: &[&str] = &[
    "snowboard co.",
    "snowboard co",
    "snowboarding",
    "snowboards",
    "snowboard",
    "co.",
    "co",
];

/// Alias map from the cleaned, lowercased brand to its canonical form.
/// Unknown keys pass through with their input casing preserved.
const BRAND_ALIASES: &[(&str, &str)] = &[
    ("lib technologies", "Lib Tech"),
    ("lib tech", "Lib Tech"),
    ("gnu", "GNU"),
    ("capita", "CAPiTA"),
    ("yes", "Yes."),
    ("yes.", "Yes."),
    ("dwd", "Dinosaurs Will Die"),
    ("dinosaurs will die", "Dinosaurs Will Die"),
    ("burton", "Burton"),
    ("k2", "K2"),
    ("rome", "Rome"),
    ("rome sds", "Rome"),
    ("never summer", "Never Summer"),
    ("jones", "Jones"),
    ("nitro", "Nitro"),
    ("arbor", "Arbor"),
    ("salomon", "Salomon"),
    ("bataleon", "Bataleon"),
    ("gentemstick", "Gentemstick"),
];

/// An immutable brand identity derived lazily from a raw scraped string.
///
/// Three stages: `cleaned` strips zero-width characters and company-form
/// suffixes; `canonical` applies the alias map; `manufacturer` selects the
/// identification strategy. Two identifiers constructed from the same raw
/// string are equal regardless of which stages have been forced.
#[derive(Debug, Clone)]
pub struct BrandIdentifier {
    raw: String,
    cleaned: OnceLock<String>,
    canonical: OnceLock<String>,
    manufacturer: OnceLock<ManufacturerKey>,
}

impl BrandIdentifier {
    pub fn new(raw: impl Into<String>) -> BrandIdentifier {
        BrandIdentifier {
            raw: raw.into(),
            cleaned: OnceLock::new(),
            canonical: OnceLock::new(),
            manufacturer: OnceLock::new(),
        }
    }

    /// The first non-empty candidate becomes the identifier. Scrapers use
    /// this to fall back across several places a page might name the brand.
    pub fn from_candidates<I, S>(candidates: I) -> Option<BrandIdentifier>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .flatten()
            .find(|c| !c.as_ref().trim().is_empty())
            .map(|c| BrandIdentifier::new(c.as_ref()))
    }

    /// The raw input, unchanged.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn cleaned(&self) -> &str {
        self.cleaned.get_or_init(|| clean(&self.raw))
    }

    pub fn canonical(&self) -> &str {
        self.canonical.get_or_init(|| {
            let cleaned = self.cleaned();
            let key = cleaned.to_lowercase();
            BRAND_ALIASES
                .iter()
                .find(|(alias, _)| *alias == key)
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or_else(|| cleaned.to_string())
        })
    }

    pub fn manufacturer(&self) -> ManufacturerKey {
        *self.manufacturer.get_or_init(|| {
            match self.canonical().to_lowercase().as_str() {
                "burton" => ManufacturerKey::Burton,
                "lib tech" | "gnu" => ManufacturerKey::Mervin,
                _ => ManufacturerKey::Default,
            }
        })
    }
}

impl PartialEq for BrandIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for BrandIdentifier {}

impl std::hash::Hash for BrandIdentifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

fn clean(raw: &str) -> String {
    let mut s = strip_zero_width(raw).trim().to_string();

    // Suffixes can stack ("Snowboard Co" then "Snowboards"), so strip to a
    // fixed point. Each suffix must sit on a word boundary.
    loop {
        let mut stripped = false;
        for suffix in BRAND_SUFFIXES {
            if s.len() <= suffix.len() || !s.is_char_boundary(s.len() - suffix.len()) {
                continue;
            }
            let at = s.len() - suffix.len();
            if s[at..].eq_ignore_ascii_case(suffix)
                && s[..at].chars().last().map_or(false, |c| c.is_whitespace())
            {
                s.truncate(at);
                s = s.trim_end().to_string();
                stripped = true;
                break;
            }
        }
        if !stripped {
            break;
        }
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cleaning_strips_company_forms() {
        let table = [
            ("Lib Technologies Snowboards", "Lib Technologies"),
            ("Burton Snowboards", "Burton"),
            ("K2 Snowboarding", "K2"),
            ("Salomon Snowboard Co.", "Salomon"),
            ("Jones Snowboards Co", "Jones"),
            ("Burton", "Burton"),
        ];
        for (raw, expect) in table {
            assert_eq!(BrandIdentifier::new(raw).cleaned(), expect, "{raw}");
        }
    }

    #[test]
    fn suffix_strip_respects_word_boundary() {
        // "Choco" ends with "co" but not on a word boundary.
        assert_eq!(BrandIdentifier::new("Choco").cleaned(), "Choco");
    }

    #[test]
    fn canonical_applies_aliases() {
        let brand = BrandIdentifier::new("Lib Technologies Snowboards");
        assert_eq!(brand.canonical(), "Lib Tech");
        assert_eq!(brand.manufacturer(), ManufacturerKey::Mervin);

        assert_eq!(BrandIdentifier::new("capita").canonical(), "CAPiTA");
        assert_eq!(BrandIdentifier::new("YES").canonical(), "Yes.");
        assert_eq!(
            BrandIdentifier::new("dwd").canonical(),
            "Dinosaurs Will Die"
        );
    }

    #[test]
    fn unknown_brands_preserve_casing() {
        assert_eq!(BrandIdentifier::new("RIDE").canonical(), "RIDE");
        assert_eq!(
            BrandIdentifier::new("Weird Brand").canonical(),
            "Weird Brand"
        );
    }

    #[test]
    fn manufacturer_dispatch() {
        assert_eq!(
            BrandIdentifier::new("Burton").manufacturer(),
            ManufacturerKey::Burton
        );
        assert_eq!(
            BrandIdentifier::new("GNU").manufacturer(),
            ManufacturerKey::Mervin
        );
        assert_eq!(
            BrandIdentifier::new("CAPiTA").manufacturer(),
            ManufacturerKey::Default
        );
    }

    #[test]
    fn from_candidates_picks_first_non_empty() {
        let brand = BrandIdentifier::from_candidates([
            None::<&str>,
            Some(""),
            Some("  "),
            Some("Burton"),
            Some("GNU"),
        ])
        .unwrap();
        assert_eq!(brand.canonical(), "Burton");

        assert_eq!(
            BrandIdentifier::from_candidates([None::<&str>, Some("")]),
            None
        );
    }

    #[test]
    fn value_equality_is_by_raw_input() {
        let a = BrandIdentifier::new("Burton");
        let b = BrandIdentifier::new("Burton");
        let _ = a.canonical(); // Force one side only.
        assert_eq!(a, b);
    }

    quickcheck::quickcheck! {
        fn canonical_ignores_zero_width(raw: String) -> bool {
            let mut noisy = raw.clone();
            noisy.insert(0, '\u{FEFF}');
            noisy.push('\u{200B}');
            BrandIdentifier::new(&raw).canonical()
                == BrandIdentifier::new(&noisy).canonical()
        }

        fn cleaning_is_idempotent(raw: String) -> bool {
            let once = clean(&raw);
            clean(&once) == once
        }
    }
}
