use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use identify::{BoardIdentifier, BoardSignal, ListingHints};
use models::{listing_id, Board, BoardKey, Gender, Listing, SourceKind};
use scrape::ScrapedBoard;
use store::SpecSourceRow;

use crate::terrain_for_category;

#[derive(Debug, Clone)]
pub struct CoalesceConfig {
    /// Currency code → USD conversion rate. Unknown currencies leave
    /// `sale_price_usd` unset.
    pub rates: BTreeMap<String, f64>,
    pub run_id: i64,
}

impl CoalesceConfig {
    pub fn new(run_id: i64, krw_to_usd: f64) -> CoalesceConfig {
        let mut rates = BTreeMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("KRW".to_string(), krw_to_usd);
        CoalesceConfig { rates, run_id }
    }
}

#[derive(Debug, Default)]
pub struct CoalesceOutput {
    /// Skeletal boards: identity, MSRP, manufacturer URL, and description
    /// set; specs null until the resolver fills them.
    pub boards: Vec<Board>,
    pub listings: Vec<Listing>,
    /// Provenance rows for the orchestrator to persist.
    pub spec_rows: Vec<SpecSourceRow>,
}

/// One scraped record after identification (phase A).
struct Identified<'a> {
    scraped: &'a ScrapedBoard,
    brand: String,
    model: String,
    variant: Option<String>,
    gender: Gender,
    year: Option<i32>,
}

/// Group scraped records by identity, split profile variants, and emit
/// boards, listings, and per-field provenance. Deterministic: the same
/// input multiset yields the same output modulo timestamps.
pub fn coalesce(
    scraped: &[ScrapedBoard],
    config: &CoalesceConfig,
    now: DateTime<Utc>,
) -> CoalesceOutput {
    // Phase A: identify every record and group by base board key.
    let mut groups: BTreeMap<String, Vec<Identified<'_>>> = BTreeMap::new();
    for record in scraped {
        let identified = identify_record(record);
        let key = BoardKey::new(&identified.brand, &identified.model, identified.gender);
        groups.entry(key.as_str().to_string()).or_default().push(identified);
    }

    let mut output = CoalesceOutput::default();
    for group in groups.into_values() {
        coalesce_group(group, config, now, &mut output);
    }
    output
}

/// The distinct `(brand, model)` identities in a scraped pool, in sorted
/// order. These are the review-site enrichment targets.
pub fn identities(scraped: &[ScrapedBoard]) -> Vec<(String, String)> {
    let mut set = BTreeSet::new();
    for record in scraped {
        let identified = identify_record(record);
        set.insert((identified.brand, identified.model));
    }
    set.into_iter().collect()
}

/// Provenance rows for one record against an already-known board key, used
/// when enrichment targets boards that exist in the store rather than
/// records flowing through coalescence.
pub fn provenance_rows(
    board_key: &BoardKey,
    record: &ScrapedBoard,
    now: DateTime<Utc>,
) -> Vec<SpecSourceRow> {
    let mut rows = Vec::new();
    write_spec_rows(board_key, record, now, &mut rows);
    rows
}

fn identify_record(record: &ScrapedBoard) -> Identified<'_> {
    let brand = record.brand_id.canonical().to_string();
    let gender = record
        .gender
        .or_else(|| {
            normalize::detect_gender(&record.raw_model, record.source_url.as_deref())
        })
        .unwrap_or(Gender::Unisex);

    let identity = identify::identify(&BoardSignal {
        raw_model: record.raw_model.clone(),
        canonical_brand: brand.clone(),
        manufacturer: record.brand_id.manufacturer(),
        source: record.source.clone(),
        source_url: record.source_url.clone(),
        profile: record.profile.clone(),
        gender: Some(gender),
    });

    let year = record.year.or_else(|| infer_year(record));

    Identified {
        scraped: record,
        brand,
        model: identity.model,
        variant: identity.profile_variant,
        gender,
        year,
    }
}

fn infer_year(record: &ScrapedBoard) -> Option<i32> {
    let identifier = BoardIdentifier::new(
        record.source.clone(),
        ListingHints {
            brand: Some(record.brand_id.raw().to_string()),
            raw_model: record.raw_model.clone(),
            url: record.source_url.clone(),
            ..Default::default()
        },
    );
    identifier.year()
}

/// Phase B: a group sharing a base key is one board unless it carries more
/// than one distinct profile variant, in which case it splits per variant.
fn coalesce_group(
    group: Vec<Identified<'_>>,
    config: &CoalesceConfig,
    now: DateTime<Utc>,
    output: &mut CoalesceOutput,
) {
    let variants: BTreeSet<String> = group
        .iter()
        .filter_map(|record| record.variant.clone())
        .collect();

    if variants.len() <= 1 {
        emit_board(&group, None, config, now, output);
        return;
    }

    // Variant lookup by normalized profile string, built from the records
    // that carried both. Records with neither an explicit variant nor a
    // recognizable profile fall back to the alphabetically-first variant.
    let mut variant_by_profile: BTreeMap<String, String> = BTreeMap::new();
    for record in &group {
        if let (Some(variant), Some(profile)) = (&record.variant, &record.scraped.profile) {
            if let Some(profile) = normalize::normalize_profile(profile) {
                variant_by_profile
                    .entry(profile.to_string())
                    .or_insert_with(|| variant.clone());
            }
        }
    }
    let first_variant = variants.iter().next().cloned().expect("nonempty variants");

    let mut by_variant: BTreeMap<String, Vec<&Identified<'_>>> = BTreeMap::new();
    for record in &group {
        let variant = record
            .variant
            .clone()
            .or_else(|| {
                let profile = record.scraped.profile.as_deref()?;
                let profile = normalize::normalize_profile(profile)?;
                variant_by_profile.get(&profile.to_string()).cloned()
            })
            .unwrap_or_else(|| first_variant.clone());
        by_variant.entry(variant).or_default().push(record);
    }

    for (variant, records) in by_variant {
        let records: Vec<Identified<'_>> = records
            .into_iter()
            .map(|r| Identified {
                scraped: r.scraped,
                brand: r.brand.clone(),
                model: r.model.clone(),
                variant: r.variant.clone(),
                gender: r.gender,
                year: r.year,
            })
            .collect();
        emit_board(&records, Some(&variant), config, now, output);
    }
}

/// Phases C through E for one final board: provenance rows, listings, and
/// the skeletal board itself.
fn emit_board(
    group: &[Identified<'_>],
    variant: Option<&str>,
    config: &CoalesceConfig,
    now: DateTime<Utc>,
    output: &mut CoalesceOutput,
) {
    let exemplar = &group[0];
    let model = match variant {
        Some(variant) => format!("{} {}", exemplar.model, variant_display(variant)),
        None => exemplar.model.clone(),
    };
    let mut board = Board::skeletal(exemplar.brand.clone(), model, exemplar.gender, now);
    board.year = group.iter().filter_map(|r| r.year).max();

    for record in group {
        write_spec_rows(&board.board_key, record.scraped, now, &mut output.spec_rows);

        if record.scraped.source.kind() == SourceKind::Manufacturer {
            if board.msrp_usd.is_none() {
                board.msrp_usd = record.scraped.msrp_usd;
            }
            if board.manufacturer_url.is_none() {
                board.manufacturer_url = record.scraped.source_url.clone();
            }
            if board.description.is_none() {
                board.description = record.scraped.description.clone();
            }
        }
    }
    // MSRP and description fall back to non-manufacturer sources.
    if board.msrp_usd.is_none() {
        board.msrp_usd = group.iter().find_map(|r| r.scraped.msrp_usd);
    }
    if board.description.is_none() {
        board.description = group
            .iter()
            .filter_map(|r| r.scraped.description.clone())
            .max_by_key(String::len);
    }

    for record in group {
        build_listings(&board.board_key, record, config, &mut output.listings);
    }

    output.boards.push(board);
}

/// Phase C: normalize the free-form spec strings and record one provenance
/// row per (field, source). Sources without terrain extras get terrain rows
/// derived from their category.
fn write_spec_rows(
    board_key: &BoardKey,
    record: &ScrapedBoard,
    now: DateTime<Utc>,
    rows: &mut Vec<SpecSourceRow>,
) {
    let mut push = |field: &str, value: String| {
        rows.push(SpecSourceRow {
            board_key: board_key.clone(),
            field: field.to_string(),
            source: record.source.clone(),
            value,
            source_url: record.source_url.clone(),
            ts: now,
        });
    };

    if let Some(flex) = record.flex.as_deref().and_then(normalize::normalize_flex) {
        push("flex", flex.to_string());
    }
    if let Some(profile) = record
        .profile
        .as_deref()
        .and_then(normalize::normalize_profile)
    {
        push("profile", profile.to_string());
    }
    if let Some(shape) = record.shape.as_deref().and_then(normalize::normalize_shape) {
        push("shape", shape.to_string());
    }

    let category = record
        .category
        .as_deref()
        .and_then(normalize::normalize_category)
        .or_else(|| {
            record
                .description
                .as_deref()
                .and_then(normalize::category_from_description)
        });
    if let Some(category) = category {
        push("category", category.to_string());
    }

    if let Some(ability) = record.ability_level.as_deref() {
        let range = normalize::normalize_ability_range(ability);
        if let Some(value) = ability_value(range) {
            push("abilityLevel", value);
        }
    }

    for (key, value) in &record.extras {
        let field = if key.eq_ignore_ascii_case("ability level") {
            "abilityLevel"
        } else {
            key.as_str()
        };
        push(field, value.clone());
    }

    let has_terrain_extras = record.extras.keys().any(|k| k.starts_with("terrain_"));
    if !has_terrain_extras {
        if let Some(category) = category {
            for (terrain, score) in terrain_for_category(category).fields() {
                if let Some(score) = score {
                    push(&format!("terrain_{terrain}"), score.to_string());
                }
            }
        }
    }
}

fn ability_value(range: models::AbilityRange) -> Option<String> {
    match (range.min, range.max) {
        (Some(min), Some(max)) if min == max => Some(min.to_string()),
        (Some(min), Some(max)) => Some(format!("{min}-{max}")),
        (Some(level), None) | (None, Some(level)) => Some(level.to_string()),
        (None, None) => None,
    }
}

/// Phase D: build persistent listings from one record's observations.
fn build_listings(
    board_key: &BoardKey,
    record: &Identified<'_>,
    config: &CoalesceConfig,
    listings: &mut Vec<Listing>,
) {
    let retailer = record.scraped.source.site().to_string();
    for observed in &record.scraped.listings {
        let rate = config.rates.get(&observed.currency.to_uppercase()).copied();
        let sale_price_usd = match (observed.sale_price, rate) {
            (Some(price), Some(rate)) => Some(price * rate),
            _ => None,
        };
        let discount_percent = match (observed.original_price, observed.sale_price) {
            (Some(original), Some(sale)) if original > sale => {
                Some(((original - sale) / original * 100.0).round() as i64)
            }
            _ => None,
        };

        let identifier = BoardIdentifier::new(
            record.scraped.source.clone(),
            ListingHints {
                brand: Some(record.scraped.brand_id.raw().to_string()),
                raw_model: record.scraped.raw_model.clone(),
                url: Some(observed.url.clone()),
                condition: observed.condition.clone(),
                gender: observed.gender,
                ..Default::default()
            },
        );

        listings.push(Listing {
            id: listing_id(&retailer, &observed.url, observed.length_cm),
            board_key: board_key.clone(),
            run_id: config.run_id,
            retailer: retailer.clone(),
            region: record.scraped.region.clone(),
            url: observed.url.clone(),
            image_url: observed.image_url.clone(),
            length_cm: observed.length_cm,
            width_mm: observed.width_mm,
            original_price: observed.original_price,
            sale_price: observed.sale_price,
            currency: observed.currency.clone(),
            sale_price_usd,
            availability: normalize::normalize_availability(observed.availability.as_deref()),
            condition: identifier.condition(),
            gender: identifier.gender().unwrap_or(record.gender),
            discount_percent,
            stock_count: observed.stock_count,
            combo_contents: observed.combo_contents.clone(),
            scraped_at: observed.scraped_at,
        });
    }
}

/// Human-facing variant casing: contour codes uppercase, words title-case.
fn variant_display(variant: &str) -> String {
    const CODES: &[&str] = &["c2", "c2x", "c2e", "c3", "btx"];
    variant
        .split_whitespace()
        .map(|token| {
            if CODES.contains(&token) {
                token.to_uppercase()
            } else {
                let mut chars = token.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod test {
    use super::*;
    use models::SourceId;
    use scrape::ScrapedListing;

    fn config() -> CoalesceConfig {
        CoalesceConfig::new(1, 0.00074)
    }

    fn retail_board(retailer: &str, brand: &str, raw_model: &str) -> ScrapedBoard {
        let mut board = ScrapedBoard::new(SourceId::retailer(retailer), brand, raw_model);
        board.listings = vec![ScrapedListing {
            length_cm: Some(154.0),
            original_price: Some(600.0),
            sale_price: Some(480.0),
            availability: Some("in stock".to_string()),
            ..ScrapedListing::new(
                format!("https://{retailer}.example/{raw_model}"),
                "USD",
            )
        }];
        board
    }

    #[test]
    fn records_with_one_identity_coalesce_to_one_board() {
        let a = retail_board("tactics", "Burton", "Burton Custom Snowboard 2026");
        let b = retail_board("evo", "Burton Snowboards", "Custom - 2026");
        let output = coalesce(&[a, b], &config(), Utc::now());

        assert_eq!(output.boards.len(), 1);
        assert_eq!(output.boards[0].board_key.as_str(), "burton|custom|unisex");
        assert_eq!(output.listings.len(), 2);
        assert!(output
            .listings
            .iter()
            .all(|l| l.board_key.as_str() == "burton|custom|unisex"));
        assert_eq!(output.boards[0].year, Some(2026));
    }

    #[test]
    fn distinct_variants_split_the_group() {
        let camber = retail_board("tactics", "Burton", "Custom Camber Snowboard");
        let flying_v = retail_board("evo", "Burton", "Custom Flying V Snowboard");
        let output = coalesce(&[camber, flying_v], &config(), Utc::now());

        let mut keys: Vec<&str> = output
            .boards
            .iter()
            .map(|b| b.board_key.as_str())
            .collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["burton|custom camber|unisex", "burton|custom flying v|unisex"]
        );

        let camber_board = output
            .boards
            .iter()
            .find(|b| b.board_key.as_str() == "burton|custom camber|unisex")
            .unwrap();
        assert_eq!(camber_board.model, "Custom Camber");
    }

    #[test]
    fn variantless_records_join_via_profile_then_alphabetical_fallback() {
        let mut camber = retail_board("tactics", "Burton", "Custom Camber Snowboard");
        camber.profile = Some("camber".to_string());
        let flying_v = retail_board("evo", "Burton", "Custom Flying V Snowboard");

        // Reports no variant in the title, but its profile string matches
        // the camber record's.
        let mut by_profile = retail_board("rei", "Burton", "Custom Snowboard");
        by_profile.profile = Some("Camber".to_string());

        // Reports nothing at all: alphabetically-first variant.
        let blind = retail_board("backcountry", "Burton", "Custom Snowboard");

        let output = coalesce(
            &[camber, flying_v, by_profile, blind],
            &config(),
            Utc::now(),
        );
        let camber_listings = output
            .listings
            .iter()
            .filter(|l| l.board_key.as_str() == "burton|custom camber|unisex")
            .count();
        // camber + by_profile + blind ("camber" < "flying v").
        assert_eq!(camber_listings, 3);
    }

    #[test]
    fn gender_partitions_groups() {
        let unisex = retail_board("tactics", "Burton", "Custom Snowboard");
        let womens = retail_board("tactics", "Burton", "Custom Snowboard - Women's");
        let output = coalesce(&[unisex, womens], &config(), Utc::now());

        let mut keys: Vec<&str> = output
            .boards
            .iter()
            .map(|b| b.board_key.as_str())
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["burton|custom|unisex", "burton|custom|womens"]);
    }

    #[test]
    fn spec_rows_carry_normalized_values_and_provenance() {
        let mut board = retail_board("tactics", "CAPiTA", "D.O.A. Snowboard");
        board.flex = Some("5.5/10".to_string());
        board.profile = Some("Hybrid Camber".to_string());
        board.shape = Some("True Twin".to_string());
        board.category = Some("All-Mountain".to_string());
        board.ability_level = Some("Intermediate - Advanced".to_string());
        board.source_url = Some("https://tactics.example/doa".to_string());

        let output = coalesce(&[board], &config(), Utc::now());
        let rows = &output.spec_rows;
        let value_of = |field: &str| {
            rows.iter()
                .find(|r| r.field == field)
                .map(|r| r.value.as_str())
        };

        assert_eq!(value_of("flex"), Some("5.5"));
        assert_eq!(value_of("profile"), Some("hybrid_camber"));
        assert_eq!(value_of("shape"), Some("true_twin"));
        assert_eq!(value_of("category"), Some("all_mountain"));
        assert_eq!(value_of("abilityLevel"), Some("intermediate-advanced"));
        // No terrain extras: derived from category.
        assert_eq!(value_of("terrain_piste"), Some("3"));
        assert_eq!(value_of("terrain_powder"), Some("1"));
        assert!(rows
            .iter()
            .all(|r| r.source == SourceId::retailer("tactics")));
    }

    #[test]
    fn terrain_extras_suppress_derivation() {
        let mut board = retail_board("tactics", "Burton", "Custom");
        board.category = Some("all mountain".to_string());
        board
            .extras
            .insert("terrain_powder".to_string(), "2".to_string());

        let output = coalesce(&[board], &config(), Utc::now());
        let powder_rows: Vec<_> = output
            .spec_rows
            .iter()
            .filter(|r| r.field == "terrain_powder")
            .collect();
        assert_eq!(powder_rows.len(), 1);
        assert_eq!(powder_rows[0].value, "2");
    }

    #[test]
    fn manufacturer_records_supply_msrp_and_url() {
        let retail = retail_board("tactics", "Burton", "Custom Snowboard");
        let mut brand_site = ScrapedBoard::new(
            SourceId::manufacturer("burton"),
            "Burton",
            "Custom Snowboard",
        );
        brand_site.msrp_usd = Some(639.95);
        brand_site.source_url = Some("https://burton.example/custom".to_string());
        brand_site.description = Some("The benchmark board.".to_string());

        let output = coalesce(&[retail, brand_site], &config(), Utc::now());
        assert_eq!(output.boards.len(), 1);
        let board = &output.boards[0];
        assert_eq!(board.msrp_usd, Some(639.95));
        assert_eq!(
            board.manufacturer_url.as_deref(),
            Some("https://burton.example/custom")
        );
        assert_eq!(board.description.as_deref(), Some("The benchmark board."));
        // Manufacturer records carry no listings.
        assert_eq!(output.listings.len(), 1);
    }

    #[test]
    fn listings_convert_currency_and_compute_discount() {
        let mut board = retail_board("hellobsek", "Burton", "Custom Snowboard");
        board.region = "kr".to_string();
        board.listings = vec![ScrapedListing {
            length_cm: Some(154.0),
            original_price: Some(800_000.0),
            sale_price: Some(600_000.0),
            availability: Some("sold out".to_string()),
            ..ScrapedListing::new("https://hellobsek.example/custom", "KRW")
        }];

        let output = coalesce(&[board], &config(), Utc::now());
        let listing = &output.listings[0];
        assert_eq!(listing.region, "kr");
        assert_eq!(listing.discount_percent, Some(25));
        assert_eq!(listing.availability, models::Availability::OutOfStock);
        let usd = listing.sale_price_usd.unwrap();
        assert!((usd - 444.0).abs() < 0.001, "got {usd}");
    }

    #[test]
    fn coalescing_twice_is_deterministic() {
        let records = vec![
            retail_board("tactics", "Burton", "Custom Camber Snowboard"),
            retail_board("evo", "Burton", "Custom Flying V Snowboard"),
            retail_board("rei", "GNU", "GNU Money C2E Snowboard"),
        ];
        let now = Utc::now();
        let first = coalesce(&records, &config(), now);
        let second = coalesce(&records, &config(), now);

        let keys = |output: &CoalesceOutput| -> Vec<String> {
            output
                .boards
                .iter()
                .map(|b| b.board_key.as_str().to_string())
                .collect()
        };
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(first.listings.len(), second.listings.len());
        assert_eq!(first.spec_rows.len(), second.spec_rows.len());
    }
}
