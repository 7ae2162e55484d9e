//! `boardctl` executes one JSON action document against the reconciliation
//! pipeline and prints the JSON reply on stdout. Diagnostics go to stderr
//! via `RUST_LOG`-filtered tracing.

mod action;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pipeline::{Pipeline, PipelineConfig, SlowScrapeOptions};
use tracing_subscriber::EnvFilter;

use crate::action::Action;

#[derive(Debug, Parser)]
#[clap(author, version, about = "Snowboard catalog reconciliation pipeline")]
struct Args {
    /// Path to the JSON action document. Reads stdin when omitted.
    action_file: Option<PathBuf>,

    #[clap(long, env = "DB_PATH", default_value = "data/snowboard-finder.db")]
    db_path: PathBuf,

    #[clap(long, env = "CACHE_DB_PATH", default_value = "data/http-cache.db")]
    cache_db_path: PathBuf,

    /// Pause between rate-sensitive page fetches.
    #[clap(long, env = "SCRAPE_DELAY_MS", default_value_t = 1000)]
    scrape_delay_ms: u64,

    #[clap(long, env = "KRW_TO_USD_RATE", default_value_t = 0.00074)]
    krw_to_usd_rate: f64,

    #[clap(long, env = "MAX_CONCURRENT_RETAILERS", default_value_t = 3)]
    max_concurrent_retailers: usize,

    /// Explicit Chrome binary for browser-backed fetches.
    #[clap(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.db_path = self.db_path.clone();
        config.cache_db_path = self.cache_db_path.clone();
        config.scrape_delay = Duration::from_millis(self.scrape_delay_ms);
        config.krw_to_usd_rate = self.krw_to_usd_rate;
        config.max_concurrent_retailers = self.max_concurrent_retailers;
        config.review_site.delay = Duration::from_millis(self.scrape_delay_ms);
        config.browser.chrome_path = self.chrome_path.clone();
        config
    }

    fn read_action(&self) -> anyhow::Result<Action> {
        let document = match &self.action_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading action document {}", path.display()))?,
            None => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("reading action document from stdin")?;
                buffer
            }
        };
        serde_json::from_str(&document).context("parsing action document")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let action = args.read_action()?;
    let pipeline = Pipeline::open(args.pipeline_config())?;

    // An interrupt must drain active browser contexts before exit.
    let browser = pipeline.browser();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, draining browsers");
            browser.close().await;
            std::process::exit(130);
        }
    });

    let reply = match action {
        Action::Run { scope } => {
            let report = pipeline.run(scope).await.context("pipeline run failed")?;
            serde_json::to_value(&report)?
        }
        Action::SlowScrape {
            delay_ms,
            max_pages,
            use_system_chrome,
        } => {
            let defaults = SlowScrapeOptions::default();
            let primed = pipeline
                .slow_scrape(SlowScrapeOptions {
                    delay: delay_ms.map(Duration::from_millis).unwrap_or(defaults.delay),
                    max_pages: max_pages.unwrap_or(defaults.max_pages),
                    use_system_chrome: use_system_chrome.unwrap_or(defaults.use_system_chrome),
                })
                .await
                .context("slow-scrape failed")?;
            serde_json::json!({ "primed": primed })
        }
        Action::ScrapeStatus => serde_json::to_value(pipeline.scrape_status()?)?,
    };

    pipeline.shutdown().await;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
