use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fetch::Fetcher;
use identify::BrandIdentifier;
use models::{RunScope, SourceId};
use scrape::{ScrapedBoard, Scraper};
use store::{CacheStore, CachedReviewUrl};

use crate::sitemap::{parse_review_slug, parse_sitemap_urls, SitemapEntry};
use crate::{extract_review_specs, model_similarity, Result};

const SITEMAP_TTL_MS: i64 = 24 * 3600 * 1000;
const REVIEW_URL_TTL_MS: i64 = 7 * 24 * 3600 * 1000;

/// Minimum Sørensen–Dice score for a sitemap candidate to count as the
/// review of a target model.
const MATCH_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct ReviewSiteConfig {
    /// Site key, which becomes the `review-site:<name>` provenance id.
    pub name: String,
    pub sitemap_url: String,
    /// Pause between page fetches; the target site is rate-sensitive.
    pub delay: Duration,
}

impl Default for ReviewSiteConfig {
    fn default() -> Self {
        ReviewSiteConfig {
            name: "the-good-ride".to_string(),
            sitemap_url: "https://www.thegoodride.com/sitemap.xml".to_string(),
            delay: Duration::from_millis(1000),
        }
    }
}

/// Enriches identified boards with review-site specs. Presented to the
/// pipeline as one more scraper whose records carry no listings.
pub struct ReviewSiteEnricher {
    config: ReviewSiteConfig,
    fetcher: Fetcher,
    cache: Arc<Mutex<CacheStore>>,
    /// `(brand, model)` pairs to look up, from the current run's identified
    /// boards or from the stored catalog.
    targets: Vec<(String, String)>,
}

impl ReviewSiteEnricher {
    pub fn new(
        config: ReviewSiteConfig,
        fetcher: Fetcher,
        cache: Arc<Mutex<CacheStore>>,
        targets: Vec<(String, String)>,
    ) -> ReviewSiteEnricher {
        ReviewSiteEnricher {
            config,
            fetcher,
            cache,
            targets,
        }
    }

    fn source_id(&self) -> SourceId {
        SourceId::review_site(&self.config.name)
    }

    /// The parsed sitemap index, via the 24-hour cache.
    pub async fn sitemap_index(&self) -> Result<Vec<SitemapEntry>> {
        {
            let cache = self.cache.lock().expect("cache lock");
            if let Some(cached) = cache.get_sitemap(&self.config.name, SITEMAP_TTL_MS)? {
                return Ok(serde_json::from_str(&cached)?);
            }
        }

        let index = self.fetcher.get_uncached(&self.config.sitemap_url).await?;
        let mut entries = Vec::new();
        for sub_url in parse_sitemap_urls(&index) {
            if !sub_url.contains("snowboardreview") {
                continue;
            }
            let sub = self.fetcher.get_uncached(&sub_url).await?;
            entries.extend(parse_sitemap_urls(&sub).iter().filter_map(|u| parse_review_slug(u)));
        }
        tracing::info!(site = %self.config.name, entries = entries.len(), "indexed review sitemap");

        let encoded = serde_json::to_string(&entries)?;
        let cache = self.cache.lock().expect("cache lock");
        cache.put_sitemap(&self.config.name, &encoded)?;
        Ok(entries)
    }

    /// Best review URL for `(brand, model)`, if any candidate scores at or
    /// above the threshold. Hits and misses both cache for seven days.
    pub async fn resolve_review_url(&self, brand: &str, model: &str) -> Result<Option<String>> {
        let brand_key = brand.to_lowercase();
        let model_key = model.to_lowercase();
        {
            let cache = self.cache.lock().expect("cache lock");
            match cache.get_review_url(&brand_key, &model_key, REVIEW_URL_TTL_MS)? {
                Some(CachedReviewUrl::Hit(url)) => return Ok(Some(url)),
                Some(CachedReviewUrl::Miss) => return Ok(None),
                None => (),
            }
        }

        let canonical = BrandIdentifier::new(brand).canonical().to_string();
        let entries = self.sitemap_index().await?;
        let best = entries
            .iter()
            .filter(|entry| {
                BrandIdentifier::new(&entry.brand)
                    .canonical()
                    .eq_ignore_ascii_case(&canonical)
            })
            .map(|entry| (model_similarity(&entry.model, model), entry))
            .filter(|(score, _)| *score >= MATCH_THRESHOLD)
            .max_by(|(a, _), (b, _)| a.total_cmp(b));

        let url = best.map(|(score, entry)| {
            tracing::debug!(brand, model, url = %entry.url, score, "matched review url");
            entry.url.clone()
        });

        let cache = self.cache.lock().expect("cache lock");
        cache.put_review_url(&brand_key, &model_key, url.as_deref())?;
        Ok(url)
    }

    /// Fetch one review page and convert its specs into a scraped record.
    pub async fn scrape_review(
        &self,
        brand: &str,
        model: &str,
        url: &str,
    ) -> Result<Option<ScrapedBoard>> {
        let html = self.fetcher.get_with_ttl(url, REVIEW_URL_TTL_MS).await?;
        let Some(specs) = extract_review_specs(&html) else {
            tracing::warn!(url, "review page had no recognizable specs");
            return Ok(None);
        };

        let mut board = ScrapedBoard::new(self.source_id(), brand, model);
        board.flex = specs.flex.map(|f| f.to_string());
        board.profile = specs.profile;
        board.shape = specs.shape;
        board.category = specs.category;
        board.ability_level = specs.ability_level;
        board.msrp_usd = specs.msrp_usd;
        board.extras = specs.extras;
        board.source_url = Some(url.to_string());
        Ok(Some(board))
    }
}

#[async_trait]
impl Scraper for ReviewSiteEnricher {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn source(&self) -> SourceId {
        self.source_id()
    }

    fn region(&self) -> &str {
        "us"
    }

    /// Sequential by design: one outstanding request, a pause between
    /// targets. A failed lookup skips the target and continues.
    async fn scrape(&self, _scope: &RunScope) -> anyhow::Result<Vec<ScrapedBoard>> {
        let mut boards = Vec::new();
        for (index, (brand, model)) in self.targets.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.delay).await;
            }

            let url = match self.resolve_review_url(brand, model).await {
                Ok(Some(url)) => url,
                Ok(None) => continue,
                Err(error) => {
                    tracing::warn!(%brand, %model, %error, "review url resolution failed");
                    continue;
                }
            };
            match self.scrape_review(brand, model, &url).await {
                Ok(Some(board)) => boards.push(board),
                Ok(None) => (),
                Err(error) => {
                    tracing::warn!(%brand, %model, %url, %error, "review scrape failed");
                }
            }
        }
        Ok(boards)
    }
}
