//! kyuujin: a patient job-listing harvester
//!
//! This crate implements a web harvester for a remote-job listing source.
//! It walks the source's paginated index, parses each listing row, enriches
//! every listing from its detail page, and exports the merged records as
//! JSONL (and optionally CSV) under a per-run directory.

pub mod config;
pub mod crawler;
pub mod output;
pub mod records;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kyuujin operations
#[derive(Debug, Error)]
pub enum KyuujinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Fetch-specific errors
///
/// `Transport` is the only retried class; everything else is terminal
/// for the URL that produced it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport failure for {url} after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    #[error("Soft redirect ceiling of {limit} exceeded starting from {url}")]
    RedirectCeiling { url: String, limit: u32 },

    #[error("Soft redirect from {url} carried no usable location header")]
    MissingLocation { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL '{url}': {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
}

/// Export-specific errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write tabular export: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not allocate a unique run directory under {}", .0.display())]
    RunDir(PathBuf),
}

/// Result type alias for kyuujin operations
pub type Result<T> = std::result::Result<T, KyuujinError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, Coordinator, Enricher, Fetcher};
pub use output::{finalize, ExportPaths};
pub use records::{CrawlResult, DetailAttributes, InlineMetadata, JobRecord, ListingStub};
pub use state::{CrawlPhase, StopReason};
