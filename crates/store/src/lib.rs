//! SQLite persistence. Two databases with independent lifecycles: the
//! primary store holds boards, listings, runs, and spec provenance; the
//! cache store holds fetched HTTP bodies and review-site lookup results.
//! Both run with WAL journaling and foreign keys on.

mod cache;
mod primary;

pub use cache::{CacheStore, CachedReviewUrl};
pub use primary::{BoardWithListings, SpecSourceRow, Store};

use std::path::Path;

/// Error type for all store operations. Database errors are fatal to the
/// phase that hits them; callers add context and surface a structured
/// failure rather than recovering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory '{path}'")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode run constraints: {0}")]
    EncodeConstraints(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    Ok(())
}

fn open_with_pragmas(path: &Path) -> Result<rusqlite::Connection> {
    ensure_parent_dir(path)?;
    let conn = rusqlite::Connection::open(path)?;
    // `journal_mode` returns the resulting mode as a row, so it must be
    // read with a query rather than `pragma_update` (which uses `execute`
    // and errors on statements that return rows).
    conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}
