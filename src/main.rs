//! Kyuujin main entry point
//!
//! This is the command-line interface for the kyuujin job-listing harvester.

use clap::Parser;
use kyuujin::config::{load_config_with_hash, validate, Config, CrawlMode, PageErrorPolicy};
use kyuujin::crawler::Coordinator;
use kyuujin::output::finalize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kyuujin: a remote job-listing harvester
///
/// Kyuujin walks a job board's paginated index, enriches every listing
/// from its detail page, and exports the accumulated records as JSONL
/// (and optionally CSV) into a timestamped run directory.
#[derive(Parser, Debug)]
#[command(name = "kyuujin")]
#[command(version = "1.0.0")]
#[command(about = "A remote job-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Write the CSV table alongside the JSONL export
    #[arg(long)]
    tabular: bool,

    /// Override the first index offset
    #[arg(long, value_name = "OFFSET")]
    offset_start: Option<u64>,

    /// Override the index offset ceiling
    #[arg(long, value_name = "OFFSET")]
    offset_max: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Fold in command-line overrides, then re-check the result
    apply_overrides(&mut config, &cli);
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kyuujin=info,warn"),
            1 => EnvFilter::new("kyuujin=debug,info"),
            2 => EnvFilter::new("kyuujin=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.tabular {
        config.output.tabular_export = true;
    }
    if let Some(offset) = cli.offset_start {
        config.crawl.start_offset = offset;
    }
    if let Some(offset) = cli.offset_max {
        config.crawl.max_offset = offset;
    }
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Kyuujin Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    match config.crawl.mode {
        CrawlMode::Offset => {
            println!("  Index template: {}", config.source.index_url);
        }
        CrawlMode::UrlList => {
            println!("  Index URLs ({}):", config.source.urls.len());
            for url in &config.source.urls {
                println!("    - {}", url);
            }
        }
    }

    println!("\nCrawl:");
    match config.crawl.mode {
        CrawlMode::Offset => {
            println!("  Mode: offset pagination");
            println!(
                "  Offsets: {} to {} (stride {})",
                config.crawl.start_offset, config.crawl.max_offset, config.crawl.offset_stride
            );
        }
        CrawlMode::UrlList => {
            println!("  Mode: url list");
        }
    }
    println!("  Page delay: {}ms", config.crawl.page_delay_ms);
    println!("  Detail concurrency: {}", config.crawl.detail_concurrency);
    println!(
        "  On page error: {}",
        match config.crawl.on_page_error {
            PageErrorPolicy::Skip => "skip",
            PageErrorPolicy::Abort => "abort",
        }
    );
    println!("  Max redirects: {}", config.crawl.max_redirects);
    println!(
        "  Retries: {} (initial delay {}ms)",
        config.crawl.max_retries, config.crawl.retry_initial_delay_ms
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!(
        "  Tabular export: {}",
        if config.output.tabular_export {
            "on"
        } else {
            "off"
        }
    );

    println!("\n✓ Configuration is valid");
    match config.crawl.mode {
        CrawlMode::Offset => {
            // Validation guarantees stride >= 1 and ceiling >= start here
            let pages =
                (config.crawl.max_offset - config.crawl.start_offset) / config.crawl.offset_stride
                    + 1;
            println!("✓ Would fetch up to {} index page(s)", pages);
        }
        CrawlMode::UrlList => {
            println!("✓ Would fetch {} index page(s)", config.source.urls.len());
        }
    }
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let output = config.output.clone();
    let mut coordinator = Coordinator::new(config)?;

    // Ctrl-C asks the loop to stop at the next safe point; records
    // accumulated so far are still exported
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            cancel.cancel();
        }
    });

    let result = match coordinator.run().await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    let paths = finalize(result, &output)?;

    println!("✓ Records written to: {}", paths.records_path.display());
    if let Some(table) = &paths.table_path {
        println!("✓ Table written to: {}", table.display());
    }

    Ok(())
}
