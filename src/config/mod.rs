//! Configuration module for kyuujin
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use kyuujin::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Harvest starts at offset: {}", config.crawl.start_offset);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, CrawlMode, OutputConfig, PageErrorPolicy, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation for callers that mutate a loaded config
pub use validation::validate;

// Re-export the index URL placeholder for template expansion
pub use validation::OFFSET_PLACEHOLDER;
