use models::{Gender, ManufacturerKey, SourceId};

/// Everything a strategy may consult when normalizing one scraped title.
#[derive(Debug, Clone)]
pub struct BoardSignal {
    pub raw_model: String,
    pub canonical_brand: String,
    pub manufacturer: ManufacturerKey,
    pub source: SourceId,
    pub source_url: Option<String>,
    /// The source's own free-form profile string, when it reports one.
    /// Mervin derives a contour code from this if the title carries none.
    pub profile: Option<String>,
    pub gender: Option<Gender>,
}

/// The canonical identity a strategy produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardIdentity {
    pub model: String,
    /// A brand-specific bend code (`camber`, `flying v`, `c2x`, ...) that
    /// splits one model name into several physical boards. Always lowercase;
    /// `None` for brands without profile variants.
    pub profile_variant: Option<String>,
}

impl BoardIdentity {
    pub fn plain(model: impl Into<String>) -> BoardIdentity {
        BoardIdentity {
            model: model.into(),
            profile_variant: None,
        }
    }
}
