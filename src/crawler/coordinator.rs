//! Crawler coordinator - breadth-first link discovery
//!
//! This module contains the discovery loop:
//! - Seeding and draining the frontier
//! - Loading each page in its own browser session
//! - Normalizing and scope-filtering the links it finds
//! - Collecting the sorted set of in-scope pages

use crate::browser::{load_page, BrowserEngine, EngineResult, PageSession};
use crate::config::{CrawlSettings, Timeouts, TraversalPolicy};
use crate::crawler::frontier::Frontier;
use crate::robots::RobotsGate;
use crate::url::{normalize, NormalizedUrl, Scope};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Breadth-first crawler over one scope
pub struct Crawler<'a, E: BrowserEngine> {
    engine: &'a E,
    scope: Scope,
    traversal: TraversalPolicy,
    timeouts: Timeouts,
    marker_selector: String,
    screenshot_dir: Option<PathBuf>,
    robots: Option<RobotsGate>,
}

impl<'a, E: BrowserEngine> Crawler<'a, E> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `engine` - Browser engine used to load pages
    /// * `settings` - Crawl settings (traversal policy, selector, screenshots)
    /// * `timeouts` - Per-call browser timeouts
    /// * `scope` - Origin and path prefix that define in-scope pages
    pub fn new(engine: &'a E, settings: &CrawlSettings, timeouts: Timeouts, scope: Scope) -> Self {
        Self {
            engine,
            scope,
            traversal: settings.traversal,
            timeouts,
            marker_selector: settings.marker_selector(),
            screenshot_dir: None,
            robots: None,
        }
    }

    /// Saves a full-page screenshot of every crawled page into `dir`
    pub fn with_debug_screenshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    /// Skips pages the robots policy disallows
    pub fn with_robots(mut self, robots: RobotsGate) -> Self {
        self.robots = Some(robots);
        self
    }

    /// Runs the crawl to completion
    ///
    /// Each dequeued URL is fully processed, and all of its links enqueued,
    /// before the next one is dequeued. A failing page is logged and
    /// skipped; it never aborts the crawl.
    ///
    /// # Returns
    ///
    /// The discovered in-scope URLs, sorted and de-duplicated. Empty when
    /// there are no seeds or none of them load.
    pub async fn crawl(&self, seeds: &[NormalizedUrl]) -> Vec<NormalizedUrl> {
        let start_time = Instant::now();
        let mut frontier = Frontier::with_seeds(seeds.iter().cloned());
        let mut discovered: BTreeSet<NormalizedUrl> = BTreeSet::new();

        tracing::info!(
            "Collecting {} URLs from {} seed(s) ...",
            self.scope.path_prefix(),
            frontier.len()
        );

        while let Some(url) = frontier.dequeue() {
            if !frontier.mark_visited(&url) {
                continue;
            }

            if let Some(robots) = &self.robots {
                if !robots.allows(url.as_url()) {
                    tracing::debug!("[collect] disallowed by robots.txt: {}", url);
                    continue;
                }
            }

            tracing::debug!("[goto] -> {}", url);

            match self.visit(&url).await {
                Ok(hrefs) => {
                    if self.scope.contains(&url) {
                        discovered.insert(url.clone());
                    }
                    self.handle_discovered_links(&url, &hrefs, &mut frontier, &mut discovered);
                }
                Err(e) => {
                    tracing::warn!("[collect] WARN {}: {}", url, e);
                    continue;
                }
            }

            tracing::info!(
                "[collect] visited={} docs={} queued={} @ {}",
                frontier.visited_len(),
                discovered.len(),
                frontier.len(),
                url
            );
        }

        tracing::info!(
            "Found {} {} URLs ({} pages visited in {:?})",
            discovered.len(),
            self.scope.path_prefix(),
            frontier.visited_len(),
            start_time.elapsed()
        );

        discovered.into_iter().collect()
    }

    /// Loads one page in a fresh session and returns its raw anchor hrefs
    ///
    /// The session is closed on every path.
    async fn visit(&self, url: &NormalizedUrl) -> EngineResult<Vec<String>> {
        let session = self.engine.open_session().await?;
        let result = self.read_page(&session, url).await;

        if let Err(e) = session.close().await {
            tracing::debug!("Failed to close session for {}: {}", url, e);
        }

        result
    }

    async fn read_page(&self, session: &E::Session, url: &NormalizedUrl) -> EngineResult<Vec<String>> {
        load_page(session, url.as_url(), &self.timeouts, &self.marker_selector).await?;

        if let Some(dir) = &self.screenshot_dir {
            let path = debug_screenshot_path(dir, url);
            match session.screenshot(&path).await {
                Ok(()) => tracing::debug!("[screenshot] {}", path.display()),
                Err(e) => tracing::warn!("[screenshot] failed for {}: {}", url, e),
            }
        }

        session.anchor_hrefs().await
    }

    /// Normalizes, scope-filters and enqueues the links found on a page
    ///
    /// - Links that fail to resolve or leave the origin are dropped silently
    /// - In-scope links join the discovered set
    /// - The traversal policy decides which links are walked further
    fn handle_discovered_links(
        &self,
        page: &NormalizedUrl,
        hrefs: &[String],
        frontier: &mut Frontier,
        discovered: &mut BTreeSet<NormalizedUrl>,
    ) {
        for href in hrefs {
            let Some(link) = normalize(href, page.as_url()) else {
                continue;
            };

            if !self.scope.same_origin(&link) {
                continue;
            }

            let in_scope = self.scope.contains(&link);
            if in_scope {
                discovered.insert(link.clone());
            }

            let should_walk = match self.traversal {
                TraversalPolicy::InScope => in_scope,
                TraversalPolicy::SameOrigin => true,
            };

            if should_walk {
                frontier.enqueue_if_new(link);
            }
        }
    }
}

/// Builds the debug screenshot path for a page
///
/// The name is the first 16 hex digits of the URL's SHA-256, so it is stable
/// across runs.
pub fn debug_screenshot_path(dir: &Path, url: &NormalizedUrl) -> PathBuf {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let hash = hex::encode(digest);
    dir.join(format!("debug-{}.png", &hash[..16]))
}
