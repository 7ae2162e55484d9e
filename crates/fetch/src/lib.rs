//! HTTP fetching with a content-addressed, TTL-bounded body cache, plus a
//! pooled headless-browser fetcher for pages that only render client-side.

mod browser;
mod http;

pub use browser::{BrowserConfig, BrowserPool};
pub use http::{url_hash, FetchConfig, Fetcher};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("retries exhausted for {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("browser navigation to {url} timed out")]
    BrowserTimeout { url: String },

    #[error("browser: {0}")]
    Browser(String),

    #[error(transparent)]
    Store(#[from] store::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
