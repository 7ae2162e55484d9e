use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use tokio::sync::Mutex;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Bound on a full navigate-and-render round trip.
    pub timeout: Duration,
    /// Explicit Chrome binary; `None` lets the launcher locate one.
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            timeout: Duration::from_secs(45),
            chrome_path: None,
        }
    }
}

/// A pool of headless browsers, one per channel key. Channels isolate
/// scrapers that need distinct browser state (cookies, cache) from one
/// another. Initialization is single-flight: the map lock is held across
/// launch, so concurrent first uses of a channel start exactly one browser.
pub struct BrowserPool {
    config: BrowserConfig,
    browsers: Mutex<HashMap<String, Arc<Browser>>>,
}

impl BrowserPool {
    pub fn new(config: BrowserConfig) -> BrowserPool {
        BrowserPool {
            config,
            browsers: Mutex::new(HashMap::new()),
        }
    }

    /// Navigate to `url` in the channel's browser and return the rendered
    /// HTML. The underlying client is synchronous, so the work runs on a
    /// blocking thread under the configured timeout.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, channel: &str, url: &str) -> Result<String> {
        let browser = self.browser_for(channel).await?;
        let url_owned = url.to_string();

        let render = tokio::task::spawn_blocking(move || -> Result<String> {
            let tab = browser
                .new_tab()
                .map_err(|e| Error::Browser(e.to_string()))?;
            tab.navigate_to(&url_owned)
                .map_err(|e| Error::Browser(e.to_string()))?;
            tab.wait_until_navigated()
                .map_err(|e| Error::Browser(e.to_string()))?;
            let html = tab
                .get_content()
                .map_err(|e| Error::Browser(e.to_string()))?;
            // Close the tab but keep the browser for reuse.
            let _ = tab.close(true);
            Ok(html)
        });

        match tokio::time::timeout(self.config.timeout, render).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(Error::Browser(join_err.to_string())),
            Err(_elapsed) => Err(Error::BrowserTimeout {
                url: url.to_string(),
            }),
        }
    }

    async fn browser_for(&self, channel: &str) -> Result<Arc<Browser>> {
        let mut browsers = self.browsers.lock().await;
        if let Some(browser) = browsers.get(channel) {
            return Ok(browser.clone());
        }

        tracing::info!(channel, "launching browser");
        let chrome_path = self.config.chrome_path.clone();
        let browser = tokio::task::spawn_blocking(move || launch(chrome_path))
            .await
            .map_err(|e| Error::Browser(e.to_string()))??;
        let browser = Arc::new(browser);
        browsers.insert(channel.to_string(), browser.clone());
        Ok(browser)
    }

    /// Drain the pool, closing every browser. Called on shutdown and on
    /// interrupt; failures are logged, never propagated.
    pub async fn close(&self) {
        let mut browsers = self.browsers.lock().await;
        let count = browsers.len();
        browsers.clear();
        if count > 0 {
            tracing::info!(count, "drained browser pool");
        }
    }
}

fn launch(chrome_path: Option<PathBuf>) -> Result<Browser> {
    let mut builder = LaunchOptions::default_builder();
    builder
        .headless(true)
        .idle_browser_timeout(Duration::from_secs(300));
    if let Some(path) = chrome_path {
        builder.path(Some(path));
    }
    let options = builder.build().map_err(|e| Error::Browser(e.to_string()))?;
    Browser::new(options).map_err(|e| Error::Browser(e.to_string()))
}
