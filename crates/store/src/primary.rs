use chrono::{DateTime, Utc};
use models::{
    AbilityLevel, Availability, Board, BoardKey, Category, Condition, Gender, Listing, Profile,
    RunScope, SearchRun, Shape, SourceId, TerrainScores,
};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::Result;

/// One provenance row: a single field value as reported by a single source
/// for a single board. `(board_key, field, source)` is unique; re-writing
/// the triple replaces the prior value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSourceRow {
    pub board_key: BoardKey,
    pub field: String,
    pub source: SourceId,
    pub value: String,
    pub source_url: Option<String>,
    pub ts: DateTime<Utc>,
}

/// A board joined to its listings, the reply shape of the action surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardWithListings {
    pub board: Board,
    pub listings: Vec<Listing>,
}

const BOOTSTRAP: &str = r#"
CREATE TABLE IF NOT EXISTS search_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    constraints_json TEXT NOT NULL,
    board_count INTEGER NOT NULL DEFAULT 0,
    retailers_queried INTEGER NOT NULL DEFAULT 0,
    duration_ms INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS boards (
    board_key TEXT PRIMARY KEY,
    brand TEXT NOT NULL,
    model TEXT NOT NULL,
    gender TEXT NOT NULL,
    year INTEGER,
    flex REAL,
    profile TEXT,
    shape TEXT,
    category TEXT,
    ability_level_min TEXT,
    ability_level_max TEXT,
    terrain_piste INTEGER,
    terrain_powder INTEGER,
    terrain_park INTEGER,
    terrain_freeride INTEGER,
    terrain_freestyle INTEGER,
    msrp_usd REAL,
    manufacturer_url TEXT,
    description TEXT,
    beginner_score REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS listings (
    id TEXT PRIMARY KEY,
    board_key TEXT NOT NULL REFERENCES boards(board_key),
    run_id INTEGER NOT NULL REFERENCES search_runs(id),
    retailer TEXT NOT NULL,
    region TEXT NOT NULL,
    url TEXT NOT NULL,
    image_url TEXT,
    length_cm REAL,
    width_mm REAL,
    original_price REAL,
    sale_price REAL,
    currency TEXT NOT NULL,
    sale_price_usd REAL,
    availability TEXT NOT NULL,
    condition TEXT NOT NULL,
    gender TEXT NOT NULL,
    discount_percent INTEGER,
    stock_count INTEGER,
    combo_contents TEXT,
    scraped_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_listings_board_key ON listings(board_key);
CREATE INDEX IF NOT EXISTS idx_listings_run_id ON listings(run_id);

CREATE TABLE IF NOT EXISTS spec_sources (
    board_key TEXT NOT NULL,
    field TEXT NOT NULL,
    source TEXT NOT NULL,
    value TEXT NOT NULL,
    source_url TEXT,
    ts TEXT NOT NULL,
    PRIMARY KEY (board_key, field, source)
);

CREATE TABLE IF NOT EXISTS spec_cache (
    board_key TEXT PRIMARY KEY,
    specs_json TEXT NOT NULL,
    resolved_at TEXT NOT NULL
);
"#;

/// Handle on the primary database.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Store> {
        let conn = crate::open_with_pragmas(path.as_ref())?;
        conn.execute_batch(BOOTSTRAP)?;
        Ok(Store { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_search_run(&self, scope: &RunScope, timestamp: DateTime<Utc>) -> Result<i64> {
        let constraints = serde_json::to_string(scope)?;
        self.conn.execute(
            "INSERT INTO search_runs (timestamp, constraints_json) VALUES (?1, ?2)",
            params![timestamp, constraints],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn finish_search_run(
        &self,
        run_id: i64,
        board_count: i64,
        retailers_queried: i64,
        duration_ms: i64,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE search_runs SET board_count = ?2, retailers_queried = ?3, duration_ms = ?4 \
             WHERE id = ?1",
            params![run_id, board_count, retailers_queried, duration_ms],
        )?;
        Ok(())
    }

    pub fn load_search_run(&self, run_id: i64) -> Result<SearchRun> {
        let run = self.conn.query_row(
            "SELECT id, timestamp, constraints_json, board_count, retailers_queried, duration_ms \
             FROM search_runs WHERE id = ?1",
            params![run_id],
            |row| {
                let constraints: String = row.get(2)?;
                Ok(SearchRun {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    constraints: serde_json::from_str(&constraints).unwrap_or_default(),
                    board_count: row.get(3)?,
                    retailers_queried: row.get(4)?,
                    duration_ms: row.get(5)?,
                })
            },
        )?;
        Ok(run)
    }

    /// Upsert boards in one transaction. `created_at` is preserved on
    /// conflict; year, MSRP, manufacturer URL, and description only ever
    /// improve (a later null does not clobber a known value).
    pub fn upsert_boards(&self, boards: &[Board]) -> Result<()> {
        self.conn.execute_batch("BEGIN;")?;
        let result = self.try_upsert_boards(boards);
        if result.is_ok() {
            self.conn.execute_batch("COMMIT;")?;
        } else {
            let _ = self.conn.execute_batch("ROLLBACK;");
        }
        result
    }

    fn try_upsert_boards(&self, boards: &[Board]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO boards (board_key, brand, model, gender, year, flex, profile, shape, \
                 category, ability_level_min, ability_level_max, terrain_piste, terrain_powder, \
                 terrain_park, terrain_freeride, terrain_freestyle, msrp_usd, manufacturer_url, \
                 description, beginner_score, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21, ?22) \
             ON CONFLICT(board_key) DO UPDATE SET \
                 brand = excluded.brand, \
                 model = excluded.model, \
                 gender = excluded.gender, \
                 year = COALESCE(excluded.year, boards.year), \
                 flex = excluded.flex, \
                 profile = excluded.profile, \
                 shape = excluded.shape, \
                 category = excluded.category, \
                 ability_level_min = excluded.ability_level_min, \
                 ability_level_max = excluded.ability_level_max, \
                 terrain_piste = excluded.terrain_piste, \
                 terrain_powder = excluded.terrain_powder, \
                 terrain_park = excluded.terrain_park, \
                 terrain_freeride = excluded.terrain_freeride, \
                 terrain_freestyle = excluded.terrain_freestyle, \
                 msrp_usd = COALESCE(excluded.msrp_usd, boards.msrp_usd), \
                 manufacturer_url = COALESCE(excluded.manufacturer_url, boards.manufacturer_url), \
                 description = COALESCE(excluded.description, boards.description), \
                 beginner_score = excluded.beginner_score, \
                 updated_at = excluded.updated_at",
        )?;
        for board in boards {
            stmt.execute(params![
                board.board_key.as_str(),
                board.brand,
                board.model,
                board.gender.to_string(),
                board.year,
                board.flex,
                board.profile.map(|p| p.to_string()),
                board.shape.map(|s| s.to_string()),
                board.category.map(|c| c.to_string()),
                board.ability_level_min.map(|a| a.to_string()),
                board.ability_level_max.map(|a| a.to_string()),
                board.terrain_scores.piste,
                board.terrain_scores.powder,
                board.terrain_scores.park,
                board.terrain_scores.freeride,
                board.terrain_scores.freestyle,
                board.msrp_usd,
                board.manufacturer_url,
                board.description,
                board.beginner_score,
                board.created_at,
                board.updated_at,
            ])?;
        }
        Ok(())
    }

    pub fn insert_listings(&self, listings: &[Listing]) -> Result<()> {
        self.conn.execute_batch("BEGIN;")?;
        let result = self.try_insert_listings(listings);
        if result.is_ok() {
            self.conn.execute_batch("COMMIT;")?;
        } else {
            let _ = self.conn.execute_batch("ROLLBACK;");
        }
        result
    }

    fn try_insert_listings(&self, listings: &[Listing]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO listings (id, board_key, run_id, retailer, region, url, \
                 image_url, length_cm, width_mm, original_price, sale_price, currency, \
                 sale_price_usd, availability, condition, gender, discount_percent, stock_count, \
                 combo_contents, scraped_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20)",
        )?;
        for listing in listings {
            stmt.execute(params![
                listing.id,
                listing.board_key.as_str(),
                listing.run_id,
                listing.retailer,
                listing.region,
                listing.url,
                listing.image_url,
                listing.length_cm,
                listing.width_mm,
                listing.original_price,
                listing.sale_price,
                listing.currency,
                listing.sale_price_usd,
                listing.availability.to_string(),
                listing.condition.to_string(),
                listing.gender.to_string(),
                listing.discount_percent,
                listing.stock_count,
                listing.combo_contents,
                listing.scraped_at,
            ])?;
        }
        Ok(())
    }

    pub fn replace_spec_source(&self, row: &SpecSourceRow) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO spec_sources (board_key, field, source, value, source_url, ts) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.board_key.as_str(),
                row.field,
                row.source.as_str(),
                row.value,
                row.source_url,
                row.ts,
            ],
        )?;
        Ok(())
    }

    pub fn replace_spec_sources(&self, rows: &[SpecSourceRow]) -> Result<()> {
        self.conn.execute_batch("BEGIN;")?;
        let result = (|| {
            for row in rows {
                self.replace_spec_source(row)?;
            }
            Ok(())
        })();
        if result.is_ok() {
            self.conn.execute_batch("COMMIT;")?;
        } else {
            let _ = self.conn.execute_batch("ROLLBACK;");
        }
        result
    }

    pub fn spec_sources_for_board(&self, board_key: &BoardKey) -> Result<Vec<SpecSourceRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT board_key, field, source, value, source_url, ts FROM spec_sources \
             WHERE board_key = ?1 ORDER BY field, source",
        )?;
        let rows = stmt
            .query_map(params![board_key.as_str()], |row| {
                Ok(SpecSourceRow {
                    board_key: BoardKey::from_raw(row.get::<_, String>(0)?),
                    field: row.get(1)?,
                    source: SourceId::from_raw(row.get::<_, String>(2)?),
                    value: row.get(3)?,
                    source_url: row.get(4)?,
                    ts: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn write_spec_cache(&self, board_key: &BoardKey, specs_json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO spec_cache (board_key, specs_json, resolved_at) \
             VALUES (?1, ?2, ?3)",
            params![board_key.as_str(), specs_json, Utc::now()],
        )?;
        Ok(())
    }

    /// Delete boards with no listings at all. Returns the number removed.
    pub fn delete_orphan_boards(&self) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM boards WHERE board_key NOT IN (SELECT DISTINCT board_key FROM listings)",
            [],
        )?;
        if deleted > 0 {
            tracing::info!(deleted, "pruned orphan boards");
        }
        Ok(deleted)
    }

    pub fn load_boards(&self) -> Result<Vec<Board>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM boards ORDER BY board_key")?;
        let boards = stmt
            .query_map([], board_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(boards)
    }

    pub fn boards_with_listings(&self, run_id: Option<i64>) -> Result<Vec<BoardWithListings>> {
        let boards = self.load_boards()?;

        let mut by_key: BTreeMap<String, Vec<Listing>> = BTreeMap::new();
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, board_key, run_id, retailer, region, url, image_url, length_cm, \
                 width_mm, original_price, sale_price, currency, sale_price_usd, availability, \
                 condition, gender, discount_percent, stock_count, combo_contents, scraped_at \
             FROM listings WHERE ?1 IS NULL OR run_id = ?1 ORDER BY board_key, retailer",
        )?;
        let listings = stmt
            .query_map(params![run_id], listing_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for listing in listings {
            by_key
                .entry(listing.board_key.as_str().to_string())
                .or_default()
                .push(listing);
        }

        Ok(boards
            .into_iter()
            .map(|board| {
                let listings = by_key.remove(board.board_key.as_str()).unwrap_or_default();
                BoardWithListings { board, listings }
            })
            .collect())
    }

    /// `(brand, model, gender)` of every stored board, for review-site
    /// enrichment of an existing catalog.
    pub fn board_identities(&self) -> Result<Vec<(String, String, Gender)>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT brand, model, gender FROM boards ORDER BY board_key")?;
        let rows = stmt
            .query_map([], |row| {
                let gender: String = row.get(2)?;
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    gender.parse::<Gender>().unwrap_or(Gender::Unisex),
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Distinct listing URLs, newest runs first. Slow-scrape cache priming
    /// walks these.
    pub fn listing_urls(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT url, MAX(run_id) AS last_run FROM listings \
             GROUP BY url ORDER BY last_run DESC, url",
        )?;
        let urls = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(urls)
    }

    pub fn board_keys(&self) -> Result<Vec<BoardKey>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT board_key FROM boards ORDER BY board_key")?;
        let keys = stmt
            .query_map([], |row| Ok(BoardKey::from_raw(row.get::<_, String>(0)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

fn parse_enum<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    let gender: String = row.get("gender")?;
    Ok(Board {
        board_key: BoardKey::from_raw(row.get::<_, String>("board_key")?),
        brand: row.get("brand")?,
        model: row.get("model")?,
        gender: gender.parse::<Gender>().unwrap_or(Gender::Unisex),
        year: row.get("year")?,
        flex: row.get("flex")?,
        profile: parse_enum::<Profile>(row.get::<_, Option<String>>("profile")?),
        shape: parse_enum::<Shape>(row.get::<_, Option<String>>("shape")?),
        category: parse_enum::<Category>(row.get::<_, Option<String>>("category")?),
        ability_level_min: parse_enum::<AbilityLevel>(
            row.get::<_, Option<String>>("ability_level_min")?,
        ),
        ability_level_max: parse_enum::<AbilityLevel>(
            row.get::<_, Option<String>>("ability_level_max")?,
        ),
        terrain_scores: TerrainScores {
            piste: row.get("terrain_piste")?,
            powder: row.get("terrain_powder")?,
            park: row.get("terrain_park")?,
            freeride: row.get("terrain_freeride")?,
            freestyle: row.get("terrain_freestyle")?,
        },
        msrp_usd: row.get("msrp_usd")?,
        manufacturer_url: row.get("manufacturer_url")?,
        description: row.get("description")?,
        beginner_score: row.get("beginner_score")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    let availability: String = row.get(13)?;
    let condition: String = row.get(14)?;
    let gender: String = row.get(15)?;
    Ok(Listing {
        id: row.get(0)?,
        board_key: BoardKey::from_raw(row.get::<_, String>(1)?),
        run_id: row.get(2)?,
        retailer: row.get(3)?,
        region: row.get(4)?,
        url: row.get(5)?,
        image_url: row.get(6)?,
        length_cm: row.get(7)?,
        width_mm: row.get(8)?,
        original_price: row.get(9)?,
        sale_price: row.get(10)?,
        currency: row.get(11)?,
        sale_price_usd: row.get(12)?,
        availability: availability.parse().unwrap_or(Availability::Unknown),
        condition: condition.parse().unwrap_or(Condition::New),
        gender: gender.parse().unwrap_or(Gender::Unisex),
        discount_percent: row.get(16)?,
        stock_count: row.get(17)?,
        combo_contents: row.get(18)?,
        scraped_at: row.get(19)?,
    })
}
