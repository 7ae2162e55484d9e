use serde::{Deserialize, Serialize};

/// Identifies where a scraped record or spec value came from, e.g.
/// `retailer:tactics`, `manufacturer:burton`, `review-site:the-good-ride`.
/// The bare identifiers `judgment` and `llm` are reserved for adjudication
/// rows written by earlier incarnations of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Manufacturer,
    ReviewSite,
    Retailer,
    Judgment,
    Llm,
    Unknown,
}

impl SourceId {
    pub fn retailer(name: &str) -> SourceId {
        SourceId(format!("retailer:{name}"))
    }

    pub fn manufacturer(name: &str) -> SourceId {
        SourceId(format!("manufacturer:{name}"))
    }

    pub fn review_site(name: &str) -> SourceId {
        SourceId(format!("review-site:{name}"))
    }

    pub fn from_raw(raw: impl Into<String>) -> SourceId {
        SourceId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> SourceKind {
        if self.0.starts_with("manufacturer:") {
            SourceKind::Manufacturer
        } else if self.0.starts_with("review-site:") {
            SourceKind::ReviewSite
        } else if self.0.starts_with("retailer:") {
            SourceKind::Retailer
        } else if self.0 == "judgment" {
            SourceKind::Judgment
        } else if self.0 == "llm" {
            SourceKind::Llm
        } else {
            SourceKind::Unknown
        }
    }

    /// Resolution priority. Manufacturers outrank review sites and past
    /// adjudications, which outrank retailers, which outrank LLM guesses.
    pub fn priority(&self) -> u8 {
        match self.kind() {
            SourceKind::Manufacturer => 4,
            SourceKind::ReviewSite | SourceKind::Judgment => 3,
            SourceKind::Retailer => 2,
            SourceKind::Llm => 1,
            SourceKind::Unknown => 0,
        }
    }

    /// The site name after the kind prefix, e.g. `tactics` for
    /// `retailer:tactics`. Bare sources return the whole identifier.
    pub fn site(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, site)) => site,
            None => &self.0,
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds_and_priorities() {
        let table = [
            ("manufacturer:burton", SourceKind::Manufacturer, 4),
            ("review-site:the-good-ride", SourceKind::ReviewSite, 3),
            ("judgment", SourceKind::Judgment, 3),
            ("retailer:evo", SourceKind::Retailer, 2),
            ("llm", SourceKind::Llm, 1),
            ("system", SourceKind::Unknown, 0),
        ];
        for (raw, kind, priority) in table {
            let source = SourceId::from_raw(raw);
            assert_eq!(source.kind(), kind, "{raw}");
            assert_eq!(source.priority(), priority, "{raw}");
        }
    }

    #[test]
    fn site_strips_prefix() {
        assert_eq!(SourceId::retailer("tactics").site(), "tactics");
        assert_eq!(SourceId::from_raw("judgment").site(), "judgment");
    }
}
