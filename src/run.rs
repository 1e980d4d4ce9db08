//! Run orchestration: cache or crawl, then export
//!
//! [`run`] owns the browser lifecycle; [`run_with_engine`] holds the actual
//! sequence and works with any [`BrowserEngine`].

use crate::browser::{BrowserEngine, ChromiumEngine};
use crate::config::Config;
use crate::crawler::{build_seeds, Crawler};
use crate::export::{Exporter, WorkerPool};
use crate::robots::{build_http_client, fetch_robots, RobotsGate};
use crate::storage::{load_urls, save_urls};
use crate::url::{NormalizedUrl, Scope};
use crate::Result;
use std::time::{Duration, Instant};
use url::Url;

/// Switches that change what a run does, as opposed to how
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Ignore an existing URL cache and crawl
    pub fresh: bool,
    /// Stop after discovery and the cache write
    pub crawl_only: bool,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// URLs in the export list
    pub discovered: usize,
    /// Whether the list came from the cache
    pub from_cache: bool,
    pub exported: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Runs a complete crawl-and-export with a Chromium browser
///
/// # Errors
///
/// Fails when the output root cannot be created or the browser cannot be
/// launched. Per-page failures are logged and counted, never returned.
pub async fn run(config: Config, options: RunOptions) -> Result<RunSummary> {
    tokio::fs::create_dir_all(&config.export.output_dir).await?;

    tracing::info!(
        "Launching browser ({})",
        if config.browser.headless { "headless" } else { "headful" }
    );
    let engine = ChromiumEngine::launch(&config.browser).await?;

    let result = run_with_engine(&engine, &config, options).await;

    if let Err(e) = engine.close().await {
        tracing::warn!("Failed to shut down browser cleanly: {}", e);
    }

    result
}

/// Runs the cache/crawl and export phases with the given engine
pub async fn run_with_engine<E: BrowserEngine>(
    engine: &E,
    config: &Config,
    options: RunOptions,
) -> Result<RunSummary> {
    let start_time = Instant::now();
    let start_url = Url::parse(&config.crawl.start_url)?;
    let scope = Scope::from_start_url(&start_url, config.crawl.scope_prefix.clone());
    let robots = load_robots_gate(config, &start_url).await;

    let cached = if options.fresh {
        tracing::info!("Ignoring URL cache (--fresh)");
        None
    } else {
        read_cache(config)
    };

    let from_cache = cached.is_some();
    let mut urls = match cached {
        Some(urls) => {
            tracing::info!(
                "Loaded {} URLs from {}",
                urls.len(),
                config.cache.urls_path.display()
            );
            urls
        }
        None => {
            let urls = crawl(engine, config, &start_url, scope, robots.clone()).await;
            match save_urls(&config.cache.urls_path, &urls) {
                Ok(()) => tracing::info!(
                    "Saved {} URLs to {}",
                    urls.len(),
                    config.cache.urls_path.display()
                ),
                Err(e) => tracing::error!(
                    "Failed to write URL cache {}: {}",
                    config.cache.urls_path.display(),
                    e
                ),
            }
            urls
        }
    };

    if let Some(gate) = &robots {
        let before = urls.len();
        urls.retain(|url| gate.allows(url.as_url()));
        if urls.len() < before {
            tracing::info!("Skipping {} URL(s) disallowed by robots.txt", before - urls.len());
        }
    }

    let mut summary = RunSummary {
        discovered: urls.len(),
        from_cache,
        ..RunSummary::default()
    };

    if options.crawl_only {
        tracing::info!("Crawl only: skipping export of {} URLs", urls.len());
        summary.elapsed = start_time.elapsed();
        return Ok(summary);
    }

    let pause = export_pause(config.export.pause(), robots.as_ref());
    let pool = WorkerPool::new(config.export.concurrency as usize, pause);
    let exporter = Exporter::new(
        engine,
        &config.export.output_dir,
        config.browser.timeouts(),
        config.crawl.marker_selector(),
    );

    tracing::info!(
        "Exporting {} pages with {} worker(s), pause {:?}",
        urls.len(),
        pool.concurrency(),
        pool.pause()
    );

    let exporter = &exporter;
    let outcomes = pool
        .run(urls, |url| async move { exporter.export(&url).await })
        .await;

    summary.exported = outcomes.iter().filter(|o| o.is_written()).count();
    summary.failed = outcomes.len() - summary.exported;
    summary.elapsed = start_time.elapsed();

    tracing::info!(
        "Done. exported={} failed={} elapsed={:?} output={}",
        summary.exported,
        summary.failed,
        summary.elapsed,
        config.export.output_dir.display()
    );

    Ok(summary)
}

/// Reads the URL cache; a corrupt cache is treated as missing
fn read_cache(config: &Config) -> Option<Vec<NormalizedUrl>> {
    match load_urls(&config.cache.urls_path) {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!(
                "Ignoring unreadable URL cache {}: {}",
                config.cache.urls_path.display(),
                e
            );
            None
        }
    }
}

async fn crawl<E: BrowserEngine>(
    engine: &E,
    config: &Config,
    start_url: &Url,
    scope: Scope,
    robots: Option<RobotsGate>,
) -> Vec<NormalizedUrl> {
    let seeds = build_seeds(start_url, &config.crawl.extra_seeds);

    let mut crawler = Crawler::new(engine, &config.crawl, config.browser.timeouts(), scope);
    if config.crawl.debug_screenshots {
        crawler = crawler.with_debug_screenshots(&config.export.output_dir);
    }
    if let Some(gate) = robots {
        crawler = crawler.with_robots(gate);
    }

    crawler.crawl(&seeds).await
}

/// Fetches robots.txt when enabled; any fetch problem falls back to allow-all
async fn load_robots_gate(config: &Config, start_url: &Url) -> Option<RobotsGate> {
    if !config.crawl.respect_robots {
        return None;
    }

    let fetched = match build_http_client() {
        Ok(client) => fetch_robots(&client, start_url, &config.browser.user_agent).await,
        Err(e) => Err(e),
    };

    match fetched {
        Ok(robots) => Some(RobotsGate::new(robots)),
        Err(e) => {
            tracing::warn!("Could not fetch robots.txt, allowing all: {}", e);
            Some(RobotsGate::allow_all())
        }
    }
}

/// The configured pause, raised to the robots crawl delay when that is longer
fn export_pause(configured: Duration, robots: Option<&RobotsGate>) -> Duration {
    match robots.and_then(RobotsGate::crawl_delay) {
        Some(delay) if delay > configured => {
            tracing::info!("Using robots.txt crawl delay {:?} between exports", delay);
            delay
        }
        _ => configured,
    }
}
