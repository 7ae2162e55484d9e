//! The pipeline orchestrator: scraper fan-out, review-site enrichment,
//! coalescence, spec resolution, and persistence, in that order. Scraper
//! failures are collected, never fatal; only database errors abort, and
//! then only the persistence phase.

mod actions;
mod orchestrate;

pub use actions::{ScrapeStatus, SlowScrapeOptions};

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fetch::{BrowserConfig, BrowserPool, FetchConfig, Fetcher};
use models::{ScraperError, SearchRun};
use review::ReviewSiteConfig;
use scrape::Scraper;
use serde::{Deserialize, Serialize};
use store::{BoardWithListings, CacheStore, Store};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub cache_db_path: PathBuf,
    pub scrape_delay: Duration,
    pub krw_to_usd_rate: f64,
    pub max_concurrent_retailers: usize,
    pub review_site: ReviewSiteConfig,
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            db_path: PathBuf::from("data/snowboard-finder.db"),
            cache_db_path: PathBuf::from("data/http-cache.db"),
            scrape_delay: Duration::from_millis(1000),
            krw_to_usd_rate: 0.00074,
            max_concurrent_retailers: 3,
            review_site: ReviewSiteConfig::default(),
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

/// The reply shape of one run: the run record, every surviving board with
/// its listings, and the scraper failures that occurred along the way.
#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run: SearchRun,
    pub boards: Vec<BoardWithListings>,
    pub errors: Vec<ScraperError>,
}

pub struct Pipeline {
    store: Store,
    cache: Arc<Mutex<CacheStore>>,
    fetcher: Fetcher,
    browser: Arc<BrowserPool>,
    scrapers: Vec<Arc<dyn Scraper>>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Open both databases, run the legacy-cache migration, and stand up
    /// the shared fetch handles. Scrapers register afterwards.
    pub fn open(config: PipelineConfig) -> anyhow::Result<Pipeline> {
        use anyhow::Context;

        let store = Store::open(&config.db_path)
            .with_context(|| format!("opening primary db at {}", config.db_path.display()))?;
        let cache = CacheStore::open(&config.cache_db_path)
            .with_context(|| format!("opening cache db at {}", config.cache_db_path.display()))?;
        cache
            .migrate_legacy_rows(&store)
            .context("migrating legacy cache tables")?;

        let cache = Arc::new(Mutex::new(cache));
        let fetcher =
            Fetcher::new(cache.clone(), config.fetch.clone()).context("building http client")?;
        let browser = Arc::new(BrowserPool::new(config.browser.clone()));

        Ok(Pipeline {
            store,
            cache,
            fetcher,
            browser,
            scrapers: vec![Arc::new(scrape::SeedScraper)],
            config,
        })
    }

    /// Add a site adapter to the registry.
    pub fn register(&mut self, scraper: Arc<dyn Scraper>) {
        self.scrapers.push(scraper);
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn browser(&self) -> Arc<BrowserPool> {
        self.browser.clone()
    }

    /// Drain browsers on shutdown or interrupt. Failure to drain is logged
    /// by the pool, never surfaced.
    pub async fn shutdown(&self) {
        self.browser.close().await;
    }
}
