use lazy_static::lazy_static;
use models::{Availability, Condition, Gender};
use regex::Regex;

lazy_static! {
    static ref WOMENS: Regex = Regex::new(r"(?i)\bwomen'?s\b|\bwmn\b").expect("womens regex");
    static ref MENS: Regex = Regex::new(r"(?i)\bmen'?s\b").expect("mens regex");
    static ref KIDS: Regex =
        Regex::new(r"(?i)\bkids'?\b|\bboys'?\b|\bgirls'?\b|\btoddlers?'?\b|\byouth\b")
            .expect("kids regex");
    static ref BLEM: Regex = Regex::new(r"(?i)\(blem\)|-\s*blem\b").expect("blem regex");
    static ref CLOSEOUT: Regex =
        Regex::new(r"(?i)\(closeout\)|-\s*closeout\b").expect("closeout regex");
}

/// Detect gender from a product title and, failing that, its URL.
/// `Women's` is tested before `Men's`; the word-boundary anchors keep the
/// latter from matching inside the former.
pub fn detect_gender(text: &str, url: Option<&str>) -> Option<Gender> {
    if WOMENS.is_match(text) {
        return Some(Gender::Womens);
    }
    if KIDS.is_match(text) {
        return Some(Gender::Kids);
    }
    if MENS.is_match(text) {
        return Some(Gender::Mens);
    }

    let url = url?.to_lowercase();
    if url.contains("-womens") {
        Some(Gender::Womens)
    } else if url.contains("-kids") {
        Some(Gender::Kids)
    } else if url.contains("-mens") {
        Some(Gender::Mens)
    } else {
        None
    }
}

/// Detect a listing's condition from its title and URL. `(Sale)` is a price
/// event, not a condition, and maps to `New`.
pub fn detect_condition(text: &str, url: Option<&str>) -> Condition {
    let url = url.map(str::to_lowercase).unwrap_or_default();

    if BLEM.is_match(text) || url.contains("-blem") || url.contains("/blem") {
        Condition::Blemished
    } else if CLOSEOUT.is_match(text) || url.contains("/outlet/") || url.contains("-closeout") {
        Condition::Closeout
    } else {
        Condition::New
    }
}

/// Normalize free-form availability text by substring. Out-of-stock
/// markers are tested first so "sold out" never reads as in stock.
pub fn normalize_availability(raw: Option<&str>) -> Availability {
    let Some(raw) = raw else {
        return Availability::Unknown;
    };
    let folded = raw.trim().to_lowercase();
    if folded.is_empty() {
        return Availability::Unknown;
    }

    let compact: String = folded.chars().filter(|c| c.is_alphanumeric()).collect();
    if compact.contains("outofstock") || folded.contains("sold out") || folded.contains("unavailable")
    {
        Availability::OutOfStock
    } else if folded.contains("low stock")
        || compact.contains("lowstock")
        || folded.contains("only")
        || folded.contains("few left")
    {
        Availability::LowStock
    } else if compact.contains("instock")
        || folded.contains("add to cart")
        || folded.contains("available")
    {
        Availability::InStock
    } else {
        Availability::Unknown
    }
}
