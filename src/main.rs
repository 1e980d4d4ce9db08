//! docprint main entry point
//!
//! This is the command-line interface for the docprint site-to-PDF exporter.

use anyhow::Context;
use clap::Parser;
use docprint::config::{load_config, split_seed_list, Overrides, TraversalPolicy};
use docprint::run::{run, RunOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docprint: print a documentation site to PDF
///
/// docprint crawls every page under a URL path prefix, caches the list of
/// pages it found, and renders each one to PDF through headless Chromium.
#[derive(Parser, Debug)]
#[command(name = "docprint")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a documentation site and print every page to PDF", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// First page of the crawl; its origin is the crawl origin
    #[arg(long, env = "START_URL")]
    start_url: Option<String>,

    /// URL path prefix of the pages to export
    #[arg(long, env = "SCOPE_PREFIX")]
    scope_prefix: Option<String>,

    /// Additional seeds, comma separated (paths or absolute URLs)
    #[arg(long, env = "EXTRA_SEEDS", value_name = "LIST")]
    extra_seeds: Option<String>,

    /// Which links are walked: in-scope or same-origin
    #[arg(long, env = "TRAVERSAL")]
    traversal: Option<TraversalPolicy>,

    /// Number of concurrent export workers (at least 1)
    #[arg(long, env = "CONCURRENCY", allow_negative_numbers = true)]
    concurrency: Option<i64>,

    /// Pause after each export, in milliseconds
    #[arg(long, env = "PAUSE_MS", allow_negative_numbers = true)]
    pause_ms: Option<i64>,

    /// Root directory for PDFs
    #[arg(long, env = "OUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Location of the discovered-URL cache
    #[arg(long, env = "URLS_JSON")]
    urls_json: Option<PathBuf>,

    /// Chrome or Chromium binary to launch
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Save a screenshot of every crawled page into the output directory
    #[arg(long)]
    debug_screenshots: bool,

    /// Skip pages disallowed by robots.txt and honour its crawl delay
    #[arg(long)]
    respect_robots: bool,

    /// Crawl even if a URL cache exists
    #[arg(long)]
    fresh: bool,

    /// Stop after discovery and the cache write
    #[arg(long)]
    crawl_only: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            start_url: self.start_url.clone(),
            scope_prefix: self.scope_prefix.clone(),
            extra_seeds: self.extra_seeds.as_deref().map(split_seed_list),
            traversal: self.traversal,
            concurrency: self.concurrency,
            pause_ms: self.pause_ms,
            output_dir: self.output_dir.clone(),
            urls_path: self.urls_json.clone(),
            executable: self.chrome_path.clone(),
            headful: self.headful,
            debug_screenshots: self.debug_screenshots,
            respect_robots: self.respect_robots,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::debug!("No configuration file, using defaults"),
    }
    let config = match load_config(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Start: {}  scope: {}  output: {}",
        config.crawl.start_url,
        config.crawl.scope_prefix,
        config.export.output_dir.display()
    );

    let options = RunOptions {
        fresh: cli.fresh,
        crawl_only: cli.crawl_only,
    };

    let output_dir = config.export.output_dir.clone();
    run(config, options)
        .await
        .with_context(|| format!("Run failed (output: {})", output_dir.display()))?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if quiet => EnvFilter::new("error"),
        Err(_) => match verbose {
            0 => EnvFilter::new("docprint=info,warn"),
            1 => EnvFilter::new("docprint=debug,info"),
            2 => EnvFilter::new("docprint=trace,debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
