use serde::Deserialize;

/// Main configuration structure for kyuujin
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// Listing source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL used to absolutize relative links found in rows and pages
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Index URL template; `{offset}` is replaced per page in offset mode
    #[serde(rename = "index-url", default)]
    pub index_url: String,

    /// Explicit index page URLs, visited in order (url-list mode)
    #[serde(default)]
    pub urls: Vec<String>,
}

/// How index pages are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CrawlMode {
    /// Walk the index template offset by offset until an empty page or the ceiling
    #[serde(rename = "offset")]
    Offset,

    /// Visit the configured URL list front to back
    #[serde(rename = "url-list")]
    UrlList,
}

/// What to do when one index page fails to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum PageErrorPolicy {
    /// Log the failure and move on to the next page
    #[serde(rename = "skip")]
    #[default]
    Skip,

    /// Abort the run, surfacing the page's error
    #[serde(rename = "abort")]
    Abort,
}

/// Harvest behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Page enumeration mode
    pub mode: CrawlMode,

    /// First offset requested in offset mode
    #[serde(rename = "start-offset", default = "default_start_offset")]
    pub start_offset: u64,

    /// Offset increment between consecutive index pages
    #[serde(rename = "offset-stride", default = "default_offset_stride")]
    pub offset_stride: u64,

    /// Highest offset that will be requested
    #[serde(rename = "max-offset", default = "default_max_offset")]
    pub max_offset: u64,

    /// Pause between consecutive index pages (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Maximum number of detail pages fetched concurrently per index page
    #[serde(rename = "detail-concurrency", default = "default_detail_concurrency")]
    pub detail_concurrency: u32,

    /// Page failure policy
    #[serde(rename = "on-page-error", default)]
    pub on_page_error: PageErrorPolicy,

    /// Maximum soft redirects followed per fetch
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Maximum retries after a transport failure
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles per attempt (milliseconds)
    #[serde(rename = "retry-initial-delay-ms", default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one timestamped subdirectory per run
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Also write the tabular (CSV) export next to the JSONL file
    #[serde(rename = "tabular-export", default)]
    pub tabular_export: bool,
}

fn default_start_offset() -> u64 {
    15
}

fn default_offset_stride() -> u64 {
    15
}

fn default_max_offset() -> u64 {
    1000
}

fn default_page_delay_ms() -> u64 {
    2000
}

fn default_detail_concurrency() -> u32 {
    4
}

fn default_max_redirects() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    500
}
