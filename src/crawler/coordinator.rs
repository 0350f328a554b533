//! Harvest coordinator - main orchestration logic
//!
//! This module contains the main harvest loop that works the source one
//! index page at a time:
//! - Enumerating pages (offset template or explicit URL list)
//! - Fetching and parsing each index page into listing stubs
//! - Enriching stubs from their detail pages, a few at a time
//! - Accumulating records and tracking the loop phase
//! - Honoring cancellation between and within pages
//!
//! One page's failure is contained by the configured policy; the records
//! accumulated so far are never discarded by a later failure.

use crate::config::{Config, CrawlMode, PageErrorPolicy, OFFSET_PLACEHOLDER};
use crate::crawler::enricher::Enricher;
use crate::crawler::fetcher::{FetchSettings, Fetcher};
use crate::crawler::listing::parse_index;
use crate::records::{CrawlResult, DetailAttributes, HeadingSplitter, JobRecord, ListingStub};
use crate::state::{CrawlPhase, StopReason};
use crate::KyuujinError;
use futures::stream::{self, StreamExt};
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What one index page contributed to the run
enum PageOutcome {
    /// The page was fetched and parsed; holds the record count
    Parsed(usize),

    /// The page failed and the skip policy moved past it
    Skipped,
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Config,
    base_url: Url,
    fetcher: Fetcher,
    enricher: Enricher,
    phase: CrawlPhase,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the shared-cookie fetcher and the enricher; no request is
    /// made until [`run`](Self::run).
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(KyuujinError)` - Bad base URL or HTTP client build failure
    pub fn new(config: Config) -> Result<Self, KyuujinError> {
        let base_url = Url::parse(&config.source.base_url)?;

        let jar = Arc::new(Jar::default());
        let fetcher = Fetcher::new(jar, FetchSettings::from(&config.crawl))?;
        let enricher = Enricher::new(base_url.clone(), Box::new(HeadingSplitter));

        Ok(Self {
            config,
            base_url,
            fetcher,
            enricher,
            phase: CrawlPhase::Idle,
            cancel: CancellationToken::new(),
        })
    }

    /// Returns the phase the harvest loop is currently in
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Returns a handle that cancels this run when triggered
    ///
    /// Cancellation is honored at the next page boundary and before each
    /// not-yet-started detail fetch; records accumulated so far stay in
    /// the result.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the harvest to completion and returns the accumulated records
    ///
    /// The terminal phase (including the stop reason) is readable via
    /// [`phase`](Self::phase) afterwards. An error is returned only when
    /// a page fails under the abort policy; the skip policy contains
    /// page failures.
    pub async fn run(&mut self) -> Result<CrawlResult, KyuujinError> {
        let result = match self.config.crawl.mode {
            CrawlMode::Offset => self.run_offset().await?,
            CrawlMode::UrlList => self.run_url_list().await?,
        };

        tracing::info!(
            "Harvest finished ({}): {} record(s) from {}/{} page(s)",
            self.phase,
            result.records.len(),
            result.pages_succeeded,
            result.pages_attempted
        );

        Ok(result)
    }

    /// Walks the index template offset by offset
    ///
    /// Stops at the first empty page, when the next offset would pass
    /// the ceiling, or on cancellation.
    async fn run_offset(&mut self) -> Result<CrawlResult, KyuujinError> {
        let mut result = CrawlResult::new();
        let template = self.config.source.index_url.clone();
        let stride = self.config.crawl.offset_stride;
        let ceiling = self.config.crawl.max_offset;
        let mut offset = self.config.crawl.start_offset;

        tracing::info!(
            "Starting offset harvest at {} (stride {}, ceiling {})",
            offset,
            stride,
            ceiling
        );

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    "Cancellation requested, stopping with {} record(s)",
                    result.records.len()
                );
                self.phase = CrawlPhase::Done(StopReason::Cancelled);
                break;
            }

            if offset > ceiling {
                tracing::info!("Offset {} exceeds ceiling {}, stopping", offset, ceiling);
                self.phase = CrawlPhase::Done(StopReason::OffsetCeiling);
                break;
            }

            let url = template.replace(OFFSET_PLACEHOLDER, &offset.to_string());
            match self.harvest_page(&url, &mut result).await? {
                PageOutcome::Parsed(0) => {
                    tracing::info!("Index page at offset {} is empty, harvest complete", offset);
                    self.phase = CrawlPhase::Done(StopReason::EmptyPage);
                    break;
                }
                PageOutcome::Parsed(count) => {
                    tracing::info!(
                        "Offset {}: {} record(s), {} accumulated",
                        offset,
                        count,
                        result.records.len()
                    );
                }
                PageOutcome::Skipped => {}
            }

            offset = match offset.checked_add(stride) {
                Some(next) => next,
                None => {
                    tracing::info!("Next offset after {} is unrepresentable, stopping", offset);
                    self.phase = CrawlPhase::Done(StopReason::OffsetCeiling);
                    break;
                }
            };
            self.pause_between_pages().await;
        }

        Ok(result)
    }

    /// Visits the configured source URLs front to back
    ///
    /// An empty page is not a stop signal here; the list is the only
    /// thing that bounds the run (besides cancellation).
    async fn run_url_list(&mut self) -> Result<CrawlResult, KyuujinError> {
        let mut result = CrawlResult::new();
        let urls = self.config.source.urls.clone();

        tracing::info!("Starting url-list harvest over {} page(s)", urls.len());

        for (index, url) in urls.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    "Cancellation requested, stopping with {} record(s)",
                    result.records.len()
                );
                self.phase = CrawlPhase::Done(StopReason::Cancelled);
                return Ok(result);
            }

            match self.harvest_page(url, &mut result).await? {
                PageOutcome::Parsed(count) => {
                    tracing::info!("Page {}/{}: {} record(s)", index + 1, urls.len(), count);
                }
                PageOutcome::Skipped => {}
            }

            if index + 1 < urls.len() {
                self.pause_between_pages().await;
            }
        }

        self.phase = CrawlPhase::Done(StopReason::SourcesExhausted);
        Ok(result)
    }

    /// Fetches, parses, and enriches one index page
    ///
    /// A fetch failure is resolved through the page error policy: skip
    /// reports `PageOutcome::Skipped`, abort surfaces the error and ends
    /// the run.
    async fn harvest_page(
        &mut self,
        url: &str,
        result: &mut CrawlResult,
    ) -> Result<PageOutcome, KyuujinError> {
        self.phase = CrawlPhase::Fetching;
        result.pages_attempted += 1;
        tracing::debug!("Fetching index page {}", url);

        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => match self.config.crawl.on_page_error {
                PageErrorPolicy::Skip => {
                    tracing::warn!("Skipping index page {}: {}", url, e);
                    return Ok(PageOutcome::Skipped);
                }
                PageErrorPolicy::Abort => {
                    tracing::error!("Aborting harvest at index page {}: {}", url, e);
                    return Err(e.into());
                }
            },
        };

        self.phase = CrawlPhase::Parsing;
        let stubs = parse_index(&body, &self.base_url);
        result.pages_succeeded += 1;

        if stubs.is_empty() {
            return Ok(PageOutcome::Parsed(0));
        }

        self.phase = CrawlPhase::Enriching;
        let records = self.enrich_page(stubs).await;
        let count = records.len();
        result.records.extend(records);
        self.phase = CrawlPhase::Accumulated;

        Ok(PageOutcome::Parsed(count))
    }

    /// Enriches one page's stubs with bounded concurrency
    ///
    /// Results come back in stub order regardless of which detail fetch
    /// finishes first. After cancellation, not-yet-started stubs skip
    /// their detail fetch and merge with empty attributes.
    async fn enrich_page(&self, stubs: Vec<ListingStub>) -> Vec<JobRecord> {
        let concurrency = self.config.crawl.detail_concurrency.max(1) as usize;
        let fetcher = &self.fetcher;
        let enricher = &self.enricher;
        let cancel = &self.cancel;

        stream::iter(stubs)
            .map(|stub| async move {
                if cancel.is_cancelled() {
                    return JobRecord::merge(stub, DetailAttributes::default());
                }
                let detail = enricher.enrich(fetcher, &stub).await;
                JobRecord::merge(stub, detail)
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Sleeps the configured inter-page delay, waking early on cancellation
    async fn pause_between_pages(&self) {
        let delay = self.config.crawl.page_delay_ms;
        if delay == 0 {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            _ = self.cancel.cancelled() => {}
        }
    }
}

/// Runs a complete harvest for the given configuration
///
/// Convenience wrapper over [`Coordinator`] for callers that do not need
/// cancellation or phase introspection.
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Accumulated records and page counters
/// * `Err(KyuujinError)` - Setup failure, or a page failure under the
///   abort policy
///
/// # Example
///
/// ```no_run
/// use kyuujin::config::load_config;
/// use kyuujin::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let result = harvest(config).await?;
/// println!("{} records", result.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config) -> Result<CrawlResult, KyuujinError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
