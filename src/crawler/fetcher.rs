//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building an HTTP client with a per-run cookie jar
//! - Rotating browser user agents per request
//! - Manual handling of soft redirects (the source answers HTTP 302
//!   where a body would normally come back)
//! - Retry logic with exponential backoff for transport failures
//! - Error classification
//!
//! Only transport failures (connect, timeout, broken stream) are
//! retried. HTTP error statuses and redirect problems are terminal for
//! the URL that produced them.

use crate::config::CrawlConfig;
use crate::FetchError;
use rand::{rng, Rng};
use reqwest::cookie::Jar;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Browser user agents rotated across requests
///
/// Each request picks one at random so the traffic does not present a
/// single synthetic identity for the whole run.
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

/// Picks a user agent string at random from the rotation pool
pub fn random_user_agent() -> &'static str {
    USER_AGENTS[rng().random_range(0..USER_AGENTS.len())]
}

/// Tunables for a single fetcher instance
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    /// Maximum soft redirects followed before giving up
    pub max_redirects: u32,

    /// Retries after the initial attempt on transport failure
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent retry
    pub retry_initial_delay: Duration,

    /// Whole-request timeout
    pub request_timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            max_retries: 3,
            retry_initial_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&CrawlConfig> for FetchSettings {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            max_redirects: config.max_redirects,
            max_retries: config.max_retries,
            retry_initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            ..Self::default()
        }
    }
}

/// Terminal outcome of one transport attempt
enum Hop {
    /// HTTP 302; holds the raw location header value when present
    Redirect(Option<String>),

    /// HTTP error status, terminal without a body read
    Failed(u16),

    /// Success response with the body read in full
    Body(String),
}

/// HTTP fetcher with manual soft-redirect handling
///
/// All fetches made through one instance share a cookie jar, so session
/// cookies set early in a run (via redirect responses or otherwise) are
/// replayed on every later request, index and detail pages alike.
pub struct Fetcher {
    client: Client,
    settings: FetchSettings,
}

impl Fetcher {
    /// Builds a fetcher around a shared cookie jar
    ///
    /// Automatic redirect following is disabled; the source leans on
    /// HTTP 302 responses that must be followed by hand with the cookie
    /// state intact.
    ///
    /// # Arguments
    ///
    /// * `jar` - Cookie jar shared across all requests of this run
    /// * `settings` - Redirect/retry/timeout tunables
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Successfully built fetcher
    /// * `Err(reqwest::Error)` - Failed to build the underlying client
    pub fn new(jar: Arc<Jar>, settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .redirect(Policy::none()) // Handle redirects manually
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, settings })
    }

    /// Fetches a URL, following soft redirects, and returns the body
    ///
    /// # Request Flow
    ///
    /// 1. GET the URL with a freshly rotated user agent and, unless the
    ///    answer is a redirect or an error status, read the body; a
    ///    transport failure anywhere in that attempt is retried with
    ///    backoff
    /// 2. On HTTP 302, resolve the location header against the current
    ///    URL and loop, up to `max_redirects` hops
    /// 3. On any status at or above 400, fail with the status
    ///
    /// Only status 302 is treated as a redirect here. Other 3xx statuses
    /// fall through to the success path and return whatever body came
    /// with them, mirroring how the source actually behaves.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchError)` - Classified failure, terminal for this URL
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut current = Url::parse(url).map_err(|e| FetchError::Url {
            url: url.to_string(),
            source: e,
        })?;
        let mut redirects = 0u32;

        while redirects < self.settings.max_redirects {
            match self.hop_with_retry(current.as_str()).await? {
                Hop::Redirect(location) => {
                    let location = location.ok_or_else(|| FetchError::MissingLocation {
                        url: current.to_string(),
                    })?;

                    let next = current.join(&location).map_err(|e| FetchError::Url {
                        url: location.clone(),
                        source: e,
                    })?;

                    tracing::debug!("Soft redirect {} -> {}", current, next);
                    current = next;
                    redirects += 1;
                }
                Hop::Failed(status) => {
                    return Err(FetchError::Status {
                        url: current.to_string(),
                        status,
                    });
                }
                Hop::Body(body) => return Ok(body),
            }
        }

        Err(FetchError::RedirectCeiling {
            url: url.to_string(),
            limit: self.settings.max_redirects,
        })
    }

    /// Runs transport attempts for one URL until a terminal outcome
    ///
    /// The user agent is re-rolled on every attempt. A failure anywhere
    /// in the attempt, connecting or mid-body, consumes one slot of the
    /// retry budget and backs off before the next try.
    async fn hop_with_retry(&self, url: &str) -> Result<Hop, FetchError> {
        let mut delay = self.settings.retry_initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.attempt(url).await {
                Ok(hop) => return Ok(hop),
                Err(e) if attempt <= self.settings.max_retries => {
                    tracing::warn!(
                        "Transport failure for {} (attempt {}): {}; retrying in {:?}",
                        url,
                        attempt,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                Err(e) => {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    /// Makes one GET attempt, reading the body unless the response is a
    /// redirect or an error status
    async fn attempt(&self, url: &str) -> Result<Hop, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, random_user_agent())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FOUND {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            return Ok(Hop::Redirect(location));
        }

        if status.as_u16() >= 400 {
            return Ok(Hop::Failed(status.as_u16()));
        }

        Ok(Hop::Body(response.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.max_redirects, 10);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.retry_initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_settings_from_crawl_config() {
        use crate::config::{CrawlMode, PageErrorPolicy};

        let crawl = CrawlConfig {
            mode: CrawlMode::Offset,
            start_offset: 15,
            offset_stride: 15,
            max_offset: 1000,
            page_delay_ms: 2000,
            detail_concurrency: 4,
            on_page_error: PageErrorPolicy::Skip,
            max_redirects: 5,
            max_retries: 2,
            retry_initial_delay_ms: 100,
        };

        let settings = FetchSettings::from(&crawl);
        assert_eq!(settings.max_redirects, 5);
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.retry_initial_delay, Duration::from_millis(100));
        // Timeouts keep their defaults
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_random_user_agent_comes_from_pool() {
        for _ in 0..20 {
            let ua = random_user_agent();
            assert!(USER_AGENTS.contains(&ua));
        }
    }

    #[test]
    fn test_build_fetcher() {
        let fetcher = Fetcher::new(Arc::new(Jar::default()), FetchSettings::default());
        assert!(fetcher.is_ok());
    }

    // Redirect and retry behavior is covered against a live mock server
    // in the integration tests.
}
