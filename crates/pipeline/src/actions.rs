use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use models::SourceKind;
use serde::{Deserialize, Serialize};

use crate::Pipeline;

/// Per-retailer count of cached detail-page bodies.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeStatus {
    pub retailers: BTreeMap<String, i64>,
}

#[derive(Debug, Clone)]
pub struct SlowScrapeOptions {
    pub delay: Duration,
    pub max_pages: usize,
    pub use_system_chrome: bool,
}

impl Default for SlowScrapeOptions {
    fn default() -> Self {
        SlowScrapeOptions {
            delay: Duration::from_millis(1000),
            max_pages: 50,
            use_system_chrome: false,
        }
    }
}

impl Pipeline {
    /// How much of each retailer's detail-page set is already cached.
    pub fn scrape_status(&self) -> anyhow::Result<ScrapeStatus> {
        let mut retailers = BTreeMap::new();
        let cache = self.cache.lock().expect("cache lock");
        for scraper in &self.scrapers {
            let source = scraper.source();
            if source.kind() != SourceKind::Retailer {
                continue;
            }
            let count = cache
                .count_bodies_matching(source.site())
                .with_context(|| format!("counting cached pages for {}", source.site()))?;
            retailers.insert(source.site().to_string(), count);
        }
        Ok(ScrapeStatus { retailers })
    }

    /// Rate-limited cache priming: walk known listing URLs and warm the
    /// body cache, pausing between requests. Individual fetch failures are
    /// logged and skipped. Returns the number of pages primed.
    pub async fn slow_scrape(&self, options: SlowScrapeOptions) -> anyhow::Result<usize> {
        let urls = self.store.listing_urls().context("loading listing urls")?;
        let mut primed = 0;

        for (index, url) in urls.iter().take(options.max_pages).enumerate() {
            if index > 0 {
                tokio::time::sleep(options.delay).await;
            }

            let result = if options.use_system_chrome {
                match self.browser.fetch("slow-scrape", url).await {
                    Ok(body) => {
                        let cache = self.cache.lock().expect("cache lock");
                        cache
                            .put_body(&fetch::url_hash(url), url, &body, 24 * 3600 * 1000)
                            .map_err(anyhow::Error::from)
                    }
                    Err(error) => Err(error.into()),
                }
            } else {
                self.fetcher.get(url).await.map(|_| ()).map_err(Into::into)
            };

            match result {
                Ok(()) => primed += 1,
                Err(error) => {
                    tracing::warn!(%url, error = %format!("{error:#}"), "slow-scrape fetch failed")
                }
            }
        }

        tracing::info!(primed, "slow-scrape pass complete");
        Ok(primed)
    }
}
