use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

lazy_static! {
    static ref RATING_BAR: Regex = Regex::new(r"/img/(\d+)\.png").expect("rating regex");
    static ref LIST_PRICE: Regex =
        Regex::new(r"(?i)list\s+price[^$]*\$\s*([\d,]+(?:\.\d+)?)").expect("price regex");
}

/// Specs lifted from one review page's labeled table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSpecs {
    pub shape: Option<String>,
    pub profile: Option<String>,
    pub category: Option<String>,
    pub ability_level: Option<String>,
    pub flex: Option<f64>,
    pub msrp_usd: Option<f64>,
    /// Every other labeled pair on the page, kept as provenance extras.
    pub extras: BTreeMap<String, String>,
}

/// Extract specs from a review page. Known labels fill the typed fields;
/// flex comes from the rating-bar image percentage; MSRP from the "List
/// Price" text. Returns `None` when the page yielded nothing usable.
pub fn extract_review_specs(html: &str) -> Option<ReviewSpecs> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tr").expect("row selector");
    let cell_selector = Selector::parse("th, td").expect("cell selector");
    let img_selector = Selector::parse("img").expect("img selector");

    let mut specs = ReviewSpecs::default();
    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() < 2 {
            continue;
        }
        let label = text_of(&cells[0]).to_lowercase();
        let value = text_of(&cells[1]);

        match label.as_str() {
            "shape" => specs.shape = non_empty(value),
            "camber profile" => specs.profile = non_empty(value),
            "riding style" => specs.category = non_empty(value),
            "ability level" => {
                // The ability cell is sometimes a rating bar too; prefer
                // its text when present.
                specs.ability_level = non_empty(value);
            }
            "flex" => {
                specs.flex = cells[1]
                    .select(&img_selector)
                    .filter_map(|img| img.value().attr("src"))
                    .find_map(rating_from_src);
            }
            "" => (),
            _ => {
                if let Some(value) = non_empty(value) {
                    specs.extras.insert(label.clone(), value);
                }
            }
        }
    }

    let page_text = document.root_element().text().collect::<String>();
    specs.msrp_usd = LIST_PRICE
        .captures(&page_text)
        .and_then(|captures| captures[1].replace(',', "").parse().ok());

    let found_anything = specs.shape.is_some()
        || specs.profile.is_some()
        || specs.category.is_some()
        || specs.flex.is_some()
        || specs.msrp_usd.is_some();
    found_anything.then_some(specs)
}

/// `/img/70.png` → flex 7.
fn rating_from_src(src: &str) -> Option<f64> {
    let captures = RATING_BAR.captures(src)?;
    let percent: f64 = captures[1].parse().ok()?;
    let flex = (percent / 10.0).round();
    (1.0..=10.0).contains(&flex).then_some(flex)
}

fn text_of(cell: &scraper::ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod test {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <p>List Price: US $639.95</p>
        <table>
          <tr><th>Riding Style</th><td>All Mountain</td></tr>
          <tr><th>Shape</th><td>Directional Twin</td></tr>
          <tr><th>Camber Profile</th><td>Hybrid Camber</td></tr>
          <tr><th>Ability Level</th><td>Intermediate - Expert</td></tr>
          <tr><th>Flex</th><td><img src="/img/60.png" alt="flex"></td></tr>
          <tr><th>Turn Initiation</th><td>Medium</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn labeled_table_extracts() {
        let specs = extract_review_specs(PAGE).unwrap();
        assert_eq!(specs.category.as_deref(), Some("All Mountain"));
        assert_eq!(specs.shape.as_deref(), Some("Directional Twin"));
        assert_eq!(specs.profile.as_deref(), Some("Hybrid Camber"));
        assert_eq!(specs.ability_level.as_deref(), Some("Intermediate - Expert"));
        assert_eq!(specs.flex, Some(6.0));
        assert_eq!(specs.msrp_usd, Some(639.95));
        assert_eq!(
            specs.extras.get("turn initiation").map(String::as_str),
            Some("Medium")
        );
    }

    #[test]
    fn rating_bars_round_to_tenths() {
        assert_eq!(rating_from_src("/img/70.png"), Some(7.0));
        assert_eq!(rating_from_src("/img/65.png"), Some(7.0));
        assert_eq!(rating_from_src("/img/100.png"), Some(10.0));
        assert_eq!(rating_from_src("/img/0.png"), None);
        assert_eq!(rating_from_src("/hero.jpg"), None);
    }

    #[test]
    fn empty_pages_yield_none() {
        assert_eq!(extract_review_specs("<html><body><p>404</p></body></html>"), None);
        assert_eq!(
            extract_review_specs("<table><tr><th>Weight</th><td>Light</td></tr></table>"),
            None
        );
    }

    #[test]
    fn msrp_with_thousands_separator() {
        let html = "<p>List Price: $1,049.95</p><table><tr><th>Shape</th><td>Tapered</td></tr></table>";
        let specs = extract_review_specs(html).unwrap();
        assert_eq!(specs.msrp_usd, Some(1049.95));
    }
}
