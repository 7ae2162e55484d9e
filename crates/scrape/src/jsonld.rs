use scraper::{Html, Selector};
use serde_json::Value;

/// Product fields lifted from a page's JSON-LD `@type=Product` block.
/// Retailer adapters prefer this over CSS selectors when a page ships it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductData {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub currency: Option<String>,
    /// The raw availability value, e.g. `https://schema.org/InStock`.
    pub availability: Option<String>,
}

/// Scan every `<script type="application/ld+json">` block for a Product.
/// Malformed JSON is logged and skipped; the page may carry several blocks.
pub fn extract_product(html: &str) -> Option<ProductData> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector");

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "skipping malformed JSON-LD block");
                continue;
            }
        };
        if let Some(product) = find_product(&value) {
            return Some(product_data(product));
        }
    }
    None
}

/// Products can sit at the top level, in a top-level array, or nested
/// inside an `@graph`.
fn find_product(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_product)
        }
        Value::Array(items) => items.iter().find_map(find_product),
        _ => None,
    }
}

fn is_product_type(type_field: Option<&Value>) -> bool {
    match type_field {
        Some(Value::String(s)) => s == "Product",
        Some(Value::Array(items)) => items.iter().any(|i| i.as_str() == Some("Product")),
        _ => false,
    }
}

fn product_data(product: &Value) -> ProductData {
    let offer = first_offer(product);
    ProductData {
        name: string_field(product.get("name")),
        brand: brand_name(product.get("brand")),
        description: string_field(product.get("description")),
        image: image_url(product.get("image")),
        price: offer.and_then(|o| number_field(o.get("price").or_else(|| o.get("lowPrice")))),
        original_price: offer.and_then(|o| number_field(o.get("highPrice"))),
        currency: offer.and_then(|o| string_field(o.get("priceCurrency"))),
        availability: offer.and_then(|o| string_field(o.get("availability"))),
    }
}

fn first_offer(product: &Value) -> Option<&Value> {
    match product.get("offers")? {
        offer @ Value::Object(_) => Some(offer),
        Value::Array(offers) => offers.first(),
        _ => None,
    }
}

fn brand_name(brand: Option<&Value>) -> Option<String> {
    match brand? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => string_field(map.get("name")),
        _ => None,
    }
}

fn image_url(image: Option<&Value>) -> Option<String> {
    match image? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(|i| string_field(Some(i))),
        Value::Object(map) => string_field(map.get("url")),
        _ => None,
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Prices appear as numbers or as strings, sometimes with a currency glyph.
fn number_field(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches(['$', '€', '£', '₩'])
            .replace(',', "")
            .parse()
            .ok(),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extracts_a_plain_product_block() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "Product",
                "name": "Custom Snowboard",
                "brand": {"@type": "Brand", "name": "Burton"},
                "image": ["https://img.example/custom.jpg"],
                "offers": {
                    "@type": "Offer",
                    "price": "479.96",
                    "priceCurrency": "USD",
                    "availability": "https://schema.org/InStock"
                }
            }
            </script></head><body></body></html>"#;

        let product = extract_product(html).unwrap();
        assert_eq!(product.name.as_deref(), Some("Custom Snowboard"));
        assert_eq!(product.brand.as_deref(), Some("Burton"));
        assert_eq!(product.price, Some(479.96));
        assert_eq!(product.currency.as_deref(), Some("USD"));
        assert_eq!(
            product.availability.as_deref(),
            Some("https://schema.org/InStock")
        );
        assert_eq!(
            product.image.as_deref(),
            Some("https://img.example/custom.jpg")
        );
    }

    #[test]
    fn finds_products_inside_a_graph() {
        let html = r#"<script type="application/ld+json">
            {"@graph": [
                {"@type": "WebSite", "name": "shop"},
                {"@type": ["Product", "Thing"], "name": "DOA",
                 "offers": [{"price": 399.95, "priceCurrency": "USD"}]}
            ]}
            </script>"#;

        let product = extract_product(html).unwrap();
        assert_eq!(product.name.as_deref(), Some("DOA"));
        assert_eq!(product.price, Some(399.95));
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let html = r#"
            <script type="application/ld+json">{not json}</script>
            <script type="application/ld+json">{"@type": "Product", "name": "Orca"}</script>"#;

        let product = extract_product(html).unwrap();
        assert_eq!(product.name.as_deref(), Some("Orca"));
    }

    #[test]
    fn pages_without_products_yield_none() {
        assert_eq!(extract_product("<html><body>hi</body></html>"), None);
    }

    #[test]
    fn string_prices_with_noise_parse() {
        let html = r#"<script type="application/ld+json">
            {"@type": "Product", "name": "X",
             "offers": {"price": "$1,299.00", "priceCurrency": "USD"}}
            </script>"#;
        assert_eq!(extract_product(html).unwrap().price, Some(1299.0));
    }
}
