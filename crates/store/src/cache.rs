use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::{Result, Store};

const BOOTSTRAP: &str = r#"
CREATE TABLE IF NOT EXISTS http_cache (
    url_hash TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    body TEXT NOT NULL,
    fetched_at INTEGER NOT NULL,
    ttl_ms INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS review_sitemap_cache (
    site TEXT PRIMARY KEY,
    entries_json TEXT NOT NULL,
    fetched_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS review_url_map (
    brand TEXT NOT NULL,
    model TEXT NOT NULL,
    url TEXT,
    resolved_at INTEGER NOT NULL,
    PRIMARY KEY (brand, model)
);
"#;

/// Tables moved out of the primary database by the one-time migration.
const LEGACY_TABLES: &[&str] = &["http_cache", "review_sitemap_cache", "review_url_map"];

/// A cached review-URL resolution. Misses are cached too, so a site we
/// could not match is not re-searched on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedReviewUrl {
    Hit(String),
    Miss,
}

/// Handle on the cache database: fetched HTTP bodies keyed by URL hash,
/// plus review-site sitemap and URL-resolution caches.
pub struct CacheStore {
    conn: Connection,
}

impl CacheStore {
    pub fn open(path: impl AsRef<Path>) -> Result<CacheStore> {
        let conn = crate::open_with_pragmas(path.as_ref())?;
        conn.execute_batch(BOOTSTRAP)?;
        Ok(CacheStore { conn })
    }

    /// Move any legacy cache rows left in the primary database into this
    /// one and drop the source tables. Safe to call on every startup; it
    /// no-ops once the tables are gone.
    pub fn migrate_legacy_rows(&self, primary: &Store) -> Result<()> {
        for table in LEGACY_TABLES {
            let exists: Option<String> = primary
                .conn()
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                continue;
            }

            let copied = match *table {
                "http_cache" => self.copy_http_cache(primary.conn())?,
                "review_sitemap_cache" => self.copy_sitemap_cache(primary.conn())?,
                _ => self.copy_url_map(primary.conn())?,
            };
            primary
                .conn()
                .execute_batch(&format!("DROP TABLE {table};"))?;
            tracing::info!(table, copied, "migrated legacy cache table");
        }
        Ok(())
    }

    fn copy_http_cache(&self, primary: &Connection) -> Result<usize> {
        let mut stmt =
            primary.prepare("SELECT url_hash, url, body, fetched_at, ttl_ms FROM http_cache")?;
        let mut copied = 0;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;
        for row in rows {
            let (url_hash, url, body, fetched_at, ttl_ms) = row?;
            self.conn.execute(
                "INSERT OR IGNORE INTO http_cache (url_hash, url, body, fetched_at, ttl_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![url_hash, url, body, fetched_at, ttl_ms],
            )?;
            copied += 1;
        }
        Ok(copied)
    }

    fn copy_sitemap_cache(&self, primary: &Connection) -> Result<usize> {
        let mut stmt =
            primary.prepare("SELECT site, entries_json, fetched_at FROM review_sitemap_cache")?;
        let mut copied = 0;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        for row in rows {
            let (site, entries, fetched_at) = row?;
            self.conn.execute(
                "INSERT OR IGNORE INTO review_sitemap_cache (site, entries_json, fetched_at) \
                 VALUES (?1, ?2, ?3)",
                params![site, entries, fetched_at],
            )?;
            copied += 1;
        }
        Ok(copied)
    }

    fn copy_url_map(&self, primary: &Connection) -> Result<usize> {
        let mut stmt =
            primary.prepare("SELECT brand, model, url, resolved_at FROM review_url_map")?;
        let mut copied = 0;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        for row in rows {
            let (brand, model, url, resolved_at) = row?;
            self.conn.execute(
                "INSERT OR IGNORE INTO review_url_map (brand, model, url, resolved_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![brand, model, url, resolved_at],
            )?;
            copied += 1;
        }
        Ok(copied)
    }

    /// Fetch a cached body if it exists and has not expired.
    pub fn get_body(&self, url_hash: &str) -> Result<Option<String>> {
        let now = Utc::now().timestamp_millis();
        let row: Option<(String, i64, i64)> = self
            .conn
            .query_row(
                "SELECT body, fetched_at, ttl_ms FROM http_cache WHERE url_hash = ?1",
                params![url_hash],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        Ok(row.and_then(|(body, fetched_at, ttl_ms)| {
            (fetched_at + ttl_ms > now).then_some(body)
        }))
    }

    /// Last-writer-wins single-row write; no enclosing transaction needed.
    pub fn put_body(&self, url_hash: &str, url: &str, body: &str, ttl_ms: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO http_cache (url_hash, url, body, fetched_at, ttl_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![url_hash, url, body, Utc::now().timestamp_millis(), ttl_ms],
        )?;
        Ok(())
    }

    pub fn prune_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp_millis();
        let pruned = self.conn.execute(
            "DELETE FROM http_cache WHERE fetched_at + ttl_ms <= ?1",
            params![now],
        )?;
        if pruned > 0 {
            tracing::debug!(pruned, "pruned expired http cache rows");
        }
        Ok(pruned)
    }

    /// Count cached bodies whose URL contains the given needle. Used for
    /// per-retailer cache coverage reporting.
    pub fn count_bodies_matching(&self, needle: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM http_cache WHERE url LIKE '%' || ?1 || '%'",
            params![needle],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_sitemap(&self, site: &str, ttl_ms: i64) -> Result<Option<String>> {
        let now = Utc::now().timestamp_millis();
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT entries_json, fetched_at FROM review_sitemap_cache WHERE site = ?1",
                params![site],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(entries, fetched_at)| (fetched_at + ttl_ms > now).then_some(entries)))
    }

    pub fn put_sitemap(&self, site: &str, entries_json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO review_sitemap_cache (site, entries_json, fetched_at) \
             VALUES (?1, ?2, ?3)",
            params![site, entries_json, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    pub fn get_review_url(
        &self,
        brand: &str,
        model: &str,
        ttl_ms: i64,
    ) -> Result<Option<CachedReviewUrl>> {
        let now = Utc::now().timestamp_millis();
        let row: Option<(Option<String>, i64)> = self
            .conn
            .query_row(
                "SELECT url, resolved_at FROM review_url_map WHERE brand = ?1 AND model = ?2",
                params![brand, model],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(url, resolved_at)| {
            (resolved_at + ttl_ms > now).then_some(match url {
                Some(url) => CachedReviewUrl::Hit(url),
                None => CachedReviewUrl::Miss,
            })
        }))
    }

    pub fn put_review_url(&self, brand: &str, model: &str, url: Option<&str>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO review_url_map (brand, model, url, resolved_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![brand, model, url, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}
