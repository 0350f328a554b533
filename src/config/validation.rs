use crate::config::types::{Config, CrawlConfig, CrawlMode, OutputConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Placeholder the index URL template must carry in offset mode
pub const OFFSET_PLACEHOLDER: &str = "{offset}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source, config.crawl.mode)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates source configuration against the selected crawl mode
fn validate_source_config(config: &SourceConfig, mode: CrawlMode) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    match mode {
        CrawlMode::Offset => {
            if config.index_url.is_empty() {
                return Err(ConfigError::Validation(
                    "index_url is required in offset mode".to_string(),
                ));
            }

            if !config.index_url.contains(OFFSET_PLACEHOLDER) {
                return Err(ConfigError::Validation(format!(
                    "index_url must contain the '{}' placeholder in offset mode",
                    OFFSET_PLACEHOLDER
                )));
            }

            // The template must yield a valid URL once the placeholder is filled
            let sample = config.index_url.replace(OFFSET_PLACEHOLDER, "0");
            Url::parse(&sample)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid index_url: {}", e)))?;
        }
        CrawlMode::UrlList => {
            if config.urls.is_empty() {
                return Err(ConfigError::Validation(
                    "urls must list at least one page in url-list mode".to_string(),
                ));
            }

            for url in &config.urls {
                Url::parse(url).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid source URL '{}': {}", url, e))
                })?;
            }
        }
    }

    Ok(())
}

/// Validates harvest behavior configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.mode == CrawlMode::Offset {
        if config.offset_stride < 1 {
            return Err(ConfigError::Validation(format!(
                "offset_stride must be >= 1, got {}",
                config.offset_stride
            )));
        }

        if config.max_offset < config.start_offset {
            return Err(ConfigError::Validation(format!(
                "max_offset ({}) must be >= start_offset ({})",
                config.max_offset, config.start_offset
            )));
        }
    }

    if config.detail_concurrency < 1 || config.detail_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and 64, got {}",
            config.detail_concurrency
        )));
    }

    if config.max_redirects < 1 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be >= 1, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates export configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::PageErrorPolicy;

    fn offset_config() -> Config {
        Config {
            source: SourceConfig {
                base_url: "https://example.com".to_string(),
                index_url: "https://example.com/?&action=get_jobs&offset={offset}".to_string(),
                urls: Vec::new(),
            },
            crawl: CrawlConfig {
                mode: CrawlMode::Offset,
                start_offset: 15,
                offset_stride: 15,
                max_offset: 1000,
                page_delay_ms: 2000,
                detail_concurrency: 4,
                on_page_error: PageErrorPolicy::Skip,
                max_redirects: 10,
                max_retries: 3,
                retry_initial_delay_ms: 500,
            },
            output: OutputConfig {
                data_dir: "./data".to_string(),
                tabular_export: true,
            },
        }
    }

    #[test]
    fn test_valid_offset_config() {
        assert!(validate(&offset_config()).is_ok());
    }

    #[test]
    fn test_base_url_must_parse() {
        let mut config = offset_config();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = offset_config();
        config.source.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_offset_mode_requires_placeholder() {
        let mut config = offset_config();
        config.source.index_url = "https://example.com/?action=get_jobs".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_offset_mode_requires_index_url() {
        let mut config = offset_config();
        config.source.index_url = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_stride_rejected() {
        let mut config = offset_config();
        config.crawl.offset_stride = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_ceiling_below_start_rejected() {
        let mut config = offset_config();
        config.crawl.start_offset = 500;
        config.crawl.max_offset = 100;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_detail_concurrency_bounds() {
        let mut config = offset_config();
        config.crawl.detail_concurrency = 0;
        assert!(validate(&config).is_err());

        config.crawl.detail_concurrency = 65;
        assert!(validate(&config).is_err());

        config.crawl.detail_concurrency = 64;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_url_list_mode_requires_urls() {
        let mut config = offset_config();
        config.crawl.mode = CrawlMode::UrlList;
        config.source.urls = Vec::new();
        assert!(validate(&config).is_err());

        config.source.urls = vec!["https://example.com/page1".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_url_list_mode_rejects_bad_urls() {
        let mut config = offset_config();
        config.crawl.mode = CrawlMode::UrlList;
        config.source.urls = vec!["https://example.com/page1".to_string(), "nope".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        let mut config = offset_config();
        config.output.data_dir = String::new();
        assert!(validate(&config).is_err());
    }
}
