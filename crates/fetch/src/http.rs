use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store::CacheStore;

use crate::{Error, Result};

/// Cache key: the full hex sha256 of the URL.
pub fn url_hash(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    /// Retries on 429/503 and transient transport failures.
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub user_agent: String,
    /// TTL applied to cached bodies unless the caller overrides it.
    pub default_ttl_ms: i64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: Duration::from_secs(15),
            max_retries: 3,
            backoff_base: Duration::from_secs(2),
            user_agent: concat!("snowboard-finder/", env!("CARGO_PKG_VERSION")).to_string(),
            default_ttl_ms: 3_600_000,
        }
    }
}

/// A cached HTTP GET client. Bodies are stored content-addressed by URL
/// hash; cache writes are last-writer-wins. The underlying client honors
/// `HTTPS_PROXY`/`HTTP_PROXY` through reqwest's system-proxy support.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    cache: Arc<Mutex<CacheStore>>,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(cache: Arc<Mutex<CacheStore>>, config: FetchConfig) -> Result<Fetcher> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: String::new(),
                source,
            })?;
        Ok(Fetcher {
            client,
            cache,
            config,
        })
    }

    /// GET a URL through the cache with the default TTL.
    pub async fn get(&self, url: &str) -> Result<String> {
        self.get_with_ttl(url, self.config.default_ttl_ms).await
    }

    /// GET a URL, serving from cache when a fresh body exists and writing
    /// back with `ttl_ms` on a miss.
    pub async fn get_with_ttl(&self, url: &str, ttl_ms: i64) -> Result<String> {
        let hash = url_hash(url);
        {
            let cache = self.cache.lock().expect("cache lock");
            if let Some(body) = cache.get_body(&hash)? {
                tracing::debug!(url, "cache hit");
                return Ok(body);
            }
        }

        let body = self.get_uncached(url).await?;

        let cache = self.cache.lock().expect("cache lock");
        cache.put_body(&hash, url, &body, ttl_ms)?;
        Ok(body)
    }

    /// GET bypassing the cache entirely, with retry and backoff on
    /// rate-limit and transient failures. Non-retryable statuses (403 and
    /// other 4xx) fail immediately.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_uncached(&self, url: &str) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(source) if is_transient(&source) && attempt < self.config.max_retries => {
                    tracing::warn!(url, attempt, error = %source, "transient failure, backing off");
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                    continue;
                }
                Err(source) => {
                    return Err(Error::Transport {
                        url: url.to_string(),
                        source,
                    })
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.as_u16() == 503 {
                if attempt >= self.config.max_retries {
                    return Err(Error::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt + 1,
                    });
                }
                tracing::warn!(url, attempt, status = status.as_u16(), "backing off");
                tokio::time::sleep(self.backoff(attempt)).await;
                attempt += 1;
                continue;
            }
            if !status.is_success() {
                return Err(Error::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return response.text().await.map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            });
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config.backoff_base * 2u32.saturating_pow(attempt)
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn url_hash_is_stable_and_full_width() {
        let a = url_hash("https://shop.example/custom");
        let b = url_hash("https://shop.example/custom");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, url_hash("https://shop.example/other"));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(Mutex::new(
            CacheStore::open(dir.path().join("cache.db")).unwrap(),
        ));
        let fetcher = Fetcher::new(cache, FetchConfig::default()).unwrap();
        assert_eq!(fetcher.backoff(0), Duration::from_secs(2));
        assert_eq!(fetcher.backoff(1), Duration::from_secs(4));
        assert_eq!(fetcher.backoff(2), Duration::from_secs(8));
    }
}
