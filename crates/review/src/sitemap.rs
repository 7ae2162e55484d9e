use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref REVIEW_PATH: Regex =
        Regex::new(r"/snowboard-reviews/([a-z0-9-]+)-snowboard-review/?$").expect("path regex");
}

/// One review page discovered in the sitemap, with the brand and model
/// parsed out of its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub brand: String,
    pub model: String,
    pub url: String,
}

/// Multi-word brand slugs, longest first so `dinosaurs-will-die` never
/// parses as brand `dinosaurs`. Slugs not listed here treat their first
/// hyphen segment as the brand.
const MULTI_WORD_BRANDS: &[(&str, &str)] = &[
    ("dinosaurs-will-die", "Dinosaurs Will Die"),
    ("public-snowboards", "Public"),
    ("united-shapes", "United Shapes"),
    ("never-summer", "Never Summer"),
    ("spring-break", "Spring Break"),
    ("lib-tech", "Lib Tech"),
    ("yes", "Yes."),
];

/// Every `<loc>` URL in a sitemap document. Parse errors end the scan and
/// keep whatever was collected.
pub fn parse_sitemap_urls(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut urls = Vec::new();
    let mut in_loc = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"loc" => in_loc = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"loc" => in_loc = false,
            Ok(Event::Text(text)) if in_loc => {
                if let Ok(url) = text.unescape() {
                    urls.push(url.trim().to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                tracing::warn!(%error, "sitemap parse error, keeping partial result");
                break;
            }
            _ => (),
        }
    }
    urls
}

/// Parse a review-page URL into a sitemap entry, if it is one.
pub fn parse_review_slug(url: &str) -> Option<SitemapEntry> {
    let captures = REVIEW_PATH.captures(url)?;
    let slug = captures.get(1)?.as_str();

    for (prefix, brand) in MULTI_WORD_BRANDS {
        if let Some(rest) = slug.strip_prefix(&format!("{prefix}-")) {
            return Some(SitemapEntry {
                brand: (*brand).to_string(),
                model: rest.replace('-', " "),
                url: url.to_string(),
            });
        }
    }

    let (brand, model) = slug.split_once('-')?;
    Some(SitemapEntry {
        brand: brand.to_string(),
        model: model.replace('-', " "),
        url: url.to_string(),
    })
}
