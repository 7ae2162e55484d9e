use serde::{Deserialize, Serialize};

use crate::Gender;

/// Zero-width and soft-hyphen code points that retail sites sneak into
/// product names. They are stripped before any comparison or key derivation
/// so that visually identical names coalesce.
pub const ZERO_WIDTH: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{00AD}'];

pub fn strip_zero_width(s: &str) -> String {
    s.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect()
}

/// The canonical identity of a physical board model:
/// `lower(brand)|lower(model)|gender`.
///
/// Keys are stable under case variation and zero-width insertion in either
/// component, and under the men's/unisex collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardKey(String);

impl BoardKey {
    pub fn new(brand: &str, model: &str, gender: Gender) -> BoardKey {
        let brand = strip_zero_width(brand).trim().to_lowercase();
        let model = strip_zero_width(model).trim().to_lowercase();
        BoardKey(format!("{brand}|{model}|{}", gender.key_tag()))
    }

    /// Re-wrap a key string read back from the store.
    pub fn from_raw(raw: impl Into<String>) -> BoardKey {
        BoardKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BoardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BoardKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_format() {
        let key = BoardKey::new("Burton", "Custom", Gender::Unisex);
        assert_eq!(key.as_str(), "burton|custom|unisex");
    }

    #[test]
    fn key_is_stable_under_case_and_zero_width() {
        let plain = BoardKey::new("Burton", "Custom", Gender::Mens);
        let noisy = BoardKey::new("BUR\u{200B}TON", "cus\u{FEFF}tom", Gender::Unisex);
        assert_eq!(plain, noisy);
    }

    #[test]
    fn gender_tags_partition_keys() {
        let unisex = BoardKey::new("Burton", "Custom", Gender::Unisex);
        let womens = BoardKey::new("Burton", "Custom", Gender::Womens);
        let kids = BoardKey::new("Burton", "Custom", Gender::Kids);
        assert_ne!(unisex, womens);
        assert_ne!(womens, kids);
    }

    quickcheck::quickcheck! {
        fn zero_width_insertion_is_invisible(brand: String, model: String) -> bool {
            let mut noisy_brand = brand.clone();
            noisy_brand.insert(0, '\u{200B}');
            let mut noisy_model = model.clone();
            noisy_model.push('\u{FEFF}');

            BoardKey::new(&brand, &model, Gender::Unisex)
                == BoardKey::new(&noisy_brand, &noisy_model, Gender::Unisex)
        }
    }
}
