use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use models::{Board, BoardKey, RunScope, RunStage, ScraperError, SourceKind};
use reconcile::CoalesceConfig;
use review::ReviewSiteEnricher;
use scrape::{ScrapedBoard, Scraper};

use crate::{Pipeline, PipelineReport};

impl Pipeline {
    /// Execute one run. The scope's `from` field selects how much of the
    /// pipeline executes: a full scrape, review-site enrichment of the
    /// stored catalog, or a bare re-resolution.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, scope: RunScope) -> anyhow::Result<PipelineReport> {
        match scope.from {
            RunStage::Scrape => self.run_full(scope).await,
            RunStage::ReviewSites => self.run_review_sites(scope).await,
            RunStage::Resolve => self.run_resolve(scope).await,
        }
    }

    async fn run_full(&self, scope: RunScope) -> anyhow::Result<PipelineReport> {
        let started = Instant::now();
        let now = Utc::now();
        let run_id = self
            .store
            .insert_search_run(&scope, now)
            .context("recording search run")?;

        // Fan out the selected scrapers. Retailer fetch volume dominates,
        // so only retailer scrapers contend for the concurrency permits.
        let selected = scrape::select(&self.scrapers, &scope);
        let retailers_queried = selected
            .iter()
            .filter(|s| s.source().kind() == SourceKind::Retailer)
            .count() as i64;
        tracing::info!(scrapers = selected.len(), "starting scraper fan-out");

        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.max_concurrent_retailers.max(1),
        ));
        let mut handles = Vec::new();
        for scraper in selected {
            let scope = scope.clone();
            let semaphore = semaphore.clone();
            let name = scraper.name().to_string();
            let handle = tokio::spawn(async move {
                let _permit = if scraper.source().kind() == SourceKind::Retailer {
                    semaphore.acquire_owned().await.ok()
                } else {
                    None
                };
                scraper.scrape(&scope).await
            });
            handles.push((name, handle));
        }

        let mut pool: Vec<ScrapedBoard> = Vec::new();
        let mut errors: Vec<ScraperError> = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(boards)) => {
                    tracing::info!(scraper = %name, boards = boards.len(), "scraper completed");
                    pool.extend(boards);
                }
                Ok(Err(error)) => {
                    tracing::warn!(scraper = %name, error = %error, "scraper failed");
                    errors.push(ScraperError {
                        scraper: name,
                        message: format!("{error:#}"),
                    });
                }
                Err(join_error) => {
                    tracing::error!(scraper = %name, %join_error, "scraper task panicked");
                    errors.push(ScraperError {
                        scraper: name,
                        message: format!("scraper task panicked: {join_error}"),
                    });
                }
            }
        }

        // Demo fallback: an entirely failed fan-out still produces a run.
        let retailer_listings: usize = pool
            .iter()
            .filter(|b| b.source.kind() == SourceKind::Retailer)
            .map(|b| b.listings.len())
            .sum();
        if retailer_listings == 0 && !errors.is_empty() {
            tracing::warn!("no retailer listings produced; substituting demo seed data");
            pool.extend(scrape::seed_boards());
            errors.push(ScraperError {
                scraper: "system".to_string(),
                message: "no retailer listings produced; substituted demo seed data".to_string(),
            });
        }

        // Review-site enrichment over the identified (brand, model) set.
        let targets = reconcile::identities(&pool);
        if !targets.is_empty() {
            let enricher = ReviewSiteEnricher::new(
                self.config.review_site.clone(),
                self.fetcher.clone(),
                self.cache.clone(),
                targets,
            );
            match enricher.scrape(&scope).await {
                Ok(records) => {
                    tracing::info!(records = records.len(), "review-site enrichment completed");
                    pool.extend(records);
                }
                Err(error) => errors.push(ScraperError {
                    scraper: enricher.name().to_string(),
                    message: format!("{error:#}"),
                }),
            }
        }

        // Coalesce, write provenance, resolve, and persist.
        let coalesce_config = CoalesceConfig::new(run_id, self.config.krw_to_usd_rate);
        let mut output = reconcile::coalesce(&pool, &coalesce_config, now);
        self.store
            .replace_spec_sources(&output.spec_rows)
            .context("writing spec provenance")?;

        for board in &mut output.boards {
            self.resolve_board_specs(board)
                .with_context(|| format!("resolving {}", board.board_key))?;
        }
        fill_discounts_from_msrp(&output.boards, &mut output.listings);

        self.store
            .upsert_boards(&output.boards)
            .context("persisting boards")?;
        self.store
            .insert_listings(&output.listings)
            .context("persisting listings")?;
        self.store
            .delete_orphan_boards()
            .context("pruning orphan boards")?;
        {
            let cache = self.cache.lock().expect("cache lock");
            cache.prune_expired().context("pruning http cache")?;
        }

        self.store.finish_search_run(
            run_id,
            output.boards.len() as i64,
            retailers_queried,
            started.elapsed().as_millis() as i64,
        )?;

        self.report(run_id, Some(run_id), errors)
    }

    async fn run_review_sites(&self, scope: RunScope) -> anyhow::Result<PipelineReport> {
        let started = Instant::now();
        let now = Utc::now();
        let run_id = self.store.insert_search_run(&scope, now)?;
        let mut errors = Vec::new();

        // Stored boards keyed by (brand, model), lowercased, so enricher
        // output maps back onto existing board keys.
        let identities = self.store.board_identities()?;
        let mut keys_by_identity: BTreeMap<(String, String), Vec<BoardKey>> = BTreeMap::new();
        for (brand, model, gender) in &identities {
            keys_by_identity
                .entry((brand.to_lowercase(), model.to_lowercase()))
                .or_default()
                .push(BoardKey::new(brand, model, *gender));
        }
        let targets: Vec<(String, String)> = keys_by_identity
            .keys()
            .map(|(brand, model)| (brand.clone(), model.clone()))
            .collect();
        tracing::info!(targets = targets.len(), "review-site pass over stored catalog");

        let enricher = ReviewSiteEnricher::new(
            self.config.review_site.clone(),
            self.fetcher.clone(),
            self.cache.clone(),
            targets,
        );
        let records = match enricher.scrape(&scope).await {
            Ok(records) => records,
            Err(error) => {
                errors.push(ScraperError {
                    scraper: enricher.name().to_string(),
                    message: format!("{error:#}"),
                });
                Vec::new()
            }
        };

        let mut rows = Vec::new();
        for record in &records {
            let identity = (
                record.brand_id.canonical().to_lowercase(),
                record.raw_model.to_lowercase(),
            );
            for board_key in keys_by_identity.get(&identity).into_iter().flatten() {
                rows.extend(reconcile::provenance_rows(board_key, record, now));
            }
        }
        self.store
            .replace_spec_sources(&rows)
            .context("writing review provenance")?;

        let board_count = self.resolve_and_persist_all()?;
        self.store.finish_search_run(
            run_id,
            board_count,
            0,
            started.elapsed().as_millis() as i64,
        )?;
        self.report(run_id, None, errors)
    }

    async fn run_resolve(&self, scope: RunScope) -> anyhow::Result<PipelineReport> {
        let started = Instant::now();
        let run_id = self.store.insert_search_run(&scope, Utc::now())?;

        let board_count = self.resolve_and_persist_all()?;
        self.store.finish_search_run(
            run_id,
            board_count,
            0,
            started.elapsed().as_millis() as i64,
        )?;
        self.report(run_id, None, Vec::new())
    }

    /// Re-run the resolver over every stored board and persist the result.
    fn resolve_and_persist_all(&self) -> anyhow::Result<i64> {
        let mut boards = self.store.load_boards()?;
        for board in &mut boards {
            self.resolve_board_specs(board)
                .with_context(|| format!("resolving {}", board.board_key))?;
        }
        self.store
            .upsert_boards(&boards)
            .context("persisting resolved boards")?;
        Ok(boards.len() as i64)
    }

    /// Resolve one board's specs from its provenance, compute the beginner
    /// score, and cache the outcome.
    fn resolve_board_specs(&self, board: &mut Board) -> anyhow::Result<()> {
        let rows = self.store.spec_sources_for_board(&board.board_key)?;
        let specs = reconcile::resolve_board(&rows);
        specs.apply(board);
        board.beginner_score = Some(models::beginner_score(
            board.flex,
            board.ability_level_min,
            board.profile,
            board.category,
        ));

        let cached = serde_json::json!({
            "flex": board.flex,
            "profile": board.profile,
            "shape": board.shape,
            "category": board.category,
            "ability_level_min": board.ability_level_min,
            "ability_level_max": board.ability_level_max,
            "terrain_scores": board.terrain_scores,
            "beginner_score": board.beginner_score,
        });
        self.store
            .write_spec_cache(&board.board_key, &cached.to_string())?;
        Ok(())
    }

    fn report(
        &self,
        run_id: i64,
        listings_run: Option<i64>,
        errors: Vec<ScraperError>,
    ) -> anyhow::Result<PipelineReport> {
        let run = self.store.load_search_run(run_id)?;
        let boards = self.store.boards_with_listings(listings_run)?;
        Ok(PipelineReport {
            run,
            boards,
            errors,
        })
    }
}

/// Listings whose source reported no original price get their discount from
/// the resolved board MSRP.
fn fill_discounts_from_msrp(boards: &[Board], listings: &mut [models::Listing]) {
    let msrp_by_key: BTreeMap<&str, f64> = boards
        .iter()
        .filter_map(|b| b.msrp_usd.map(|msrp| (b.board_key.as_str(), msrp)))
        .collect();

    for listing in listings {
        if listing.discount_percent.is_some() {
            continue;
        }
        let (Some(msrp), Some(sale)) = (
            msrp_by_key.get(listing.board_key.as_str()).copied(),
            listing.sale_price_usd,
        ) else {
            continue;
        };
        if msrp > sale {
            listing.discount_percent = Some(((msrp - sale) / msrp * 100.0).round() as i64);
        }
    }
}
