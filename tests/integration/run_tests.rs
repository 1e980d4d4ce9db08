//! Integration tests for discovery and the full run
//!
//! These tests drive the crawler and the run orchestrator against an
//! in-memory browser engine that serves a fixed link graph.

use async_trait::async_trait;
use docprint::browser::{
    BrowserEngine, EngineError, EngineResult, PageSession, PdfOptions, WaitOutcome,
};
use docprint::config::{Config, Timeouts, TraversalPolicy};
use docprint::crawler::{build_seeds, Crawler};
use docprint::run::{run_with_engine, RunOptions};
use docprint::storage::{load_urls, save_urls};
use docprint::{NormalizedUrl, Scope};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

/// A site: URL -> (title, hrefs)
#[derive(Default)]
struct Site {
    pages: HashMap<String, (String, Vec<String>)>,
    navigations: Mutex<Vec<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    /// Selector waits fail the way an unparsable selector does in the browser
    broken_selector_wait: bool,
}

#[derive(Clone, Default)]
struct MemoryEngine {
    site: Arc<Site>,
}

impl MemoryEngine {
    fn new(pages: &[(&str, &str, &[&str])]) -> Self {
        let pages = pages
            .iter()
            .map(|(url, title, hrefs)| {
                (
                    url.to_string(),
                    (title.to_string(), hrefs.iter().map(|h| h.to_string()).collect()),
                )
            })
            .collect();
        Self {
            site: Arc::new(Site {
                pages,
                ..Site::default()
            }),
        }
    }

    fn with_broken_selector_wait(self) -> Self {
        let site = Arc::try_unwrap(self.site).unwrap_or_else(|_| panic!("site is shared"));
        Self {
            site: Arc::new(Site {
                broken_selector_wait: true,
                ..site
            }),
        }
    }

    fn visits(&self, url: &str) -> usize {
        self.site
            .navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    fn opened(&self) -> usize {
        self.site.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.site.closed.load(Ordering::SeqCst)
    }
}

struct MemorySession {
    site: Arc<Site>,
    current: Mutex<Option<String>>,
}

impl MemorySession {
    fn page(&self) -> EngineResult<(String, Vec<String>)> {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.site.pages.get(&url).cloned())
            .ok_or_else(|| EngineError::Script("no document".to_string()))
    }
}

#[async_trait]
impl BrowserEngine for MemoryEngine {
    type Session = MemorySession;

    async fn open_session(&self) -> EngineResult<MemorySession> {
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession {
            site: Arc::clone(&self.site),
            current: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PageSession for MemorySession {
    async fn navigate(&self, url: &Url, _timeout: Duration) -> EngineResult<()> {
        let url = url.as_str().to_string();
        self.site.navigations.lock().unwrap().push(url.clone());
        if !self.site.pages.contains_key(&url) {
            return Err(EngineError::Navigation {
                url,
                message: "404".to_string(),
            });
        }
        *self.current.lock().unwrap() = Some(url);
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> WaitOutcome {
        WaitOutcome::Ready
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> WaitOutcome {
        if self.site.broken_selector_wait {
            return WaitOutcome::Failed(EngineError::Script(format!(
                "SyntaxError: Failed to execute 'querySelector': '{}' is not a valid selector",
                selector
            )));
        }
        WaitOutcome::TimedOut
    }

    async fn inject_style(&self, _css: &str) -> EngineResult<()> {
        Ok(())
    }

    async fn emulate_print_media(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn title(&self) -> EngineResult<Option<String>> {
        Ok(Some(self.page()?.0))
    }

    async fn anchor_hrefs(&self) -> EngineResult<Vec<String>> {
        Ok(self.page()?.1)
    }

    async fn screenshot(&self, path: &Path) -> EngineResult<()> {
        std::fs::write(path, b"PNG")?;
        Ok(())
    }

    async fn print_to_pdf(&self, path: &Path, options: &PdfOptions) -> EngineResult<()> {
        self.page()?;
        std::fs::write(path, options.header_template.as_bytes())?;
        Ok(())
    }

    async fn close(self) -> EngineResult<()> {
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn timeouts() -> Timeouts {
    Timeouts {
        navigation: Duration::from_secs(1),
        idle: Duration::from_secs(1),
        selector: Duration::from_secs(1),
    }
}

fn scope() -> Scope {
    Scope::from_start_url(&Url::parse("https://x.test/docs/").unwrap(), "/docs/")
}

fn seeds(urls: &[&str]) -> Vec<NormalizedUrl> {
    urls.iter().map(|u| NormalizedUrl::parse(u).unwrap()).collect()
}

fn strings(urls: &[NormalizedUrl]) -> Vec<&str> {
    urls.iter().map(NormalizedUrl::as_str).collect()
}

/// Creates a test configuration rooted in a temporary directory
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawl.start_url = "https://x.test/docs/".to_string();
    config.crawl.scope_prefix = "/docs/".to_string();
    config.export.concurrency = 2;
    config.export.pause_ms = 0;
    config.export.output_dir = dir.path().join("pdf-out");
    config.cache.urls_path = dir.path().join("urls.json");
    config.browser.navigation_timeout_secs = 1;
    config.browser.idle_timeout_secs = 1;
    config.browser.selector_timeout_secs = 1;
    config
}

fn docs_site() -> MemoryEngine {
    MemoryEngine::new(&[
        ("https://x.test/docs/", "Docs Home", &["/docs/a", "/other/b"]),
        ("https://x.test/docs/a", "Page A", &["/docs/", "../docs/a#section"]),
        ("https://x.test/other/b", "Other", &[]),
    ])
}

#[tokio::test]
async fn test_crawl_single_seed_scope_filtering() {
    let engine = docs_site();
    let config = Config::default();
    let crawler = Crawler::new(&engine, &config.crawl, timeouts(), scope());

    let found = crawler.crawl(&seeds(&["https://x.test/docs/"])).await;

    assert_eq!(strings(&found), vec!["https://x.test/docs/", "https://x.test/docs/a"]);
    assert_eq!(engine.visits("https://x.test/other/b"), 0);
}

#[tokio::test]
async fn test_crawl_cycle_visits_each_page_once() {
    let engine = MemoryEngine::new(&[
        ("https://x.test/docs/", "Home", &["/docs/a", "/docs/b", "/docs/a?x=1"]),
        ("https://x.test/docs/a", "A", &["/docs/b", "/docs/#top"]),
        ("https://x.test/docs/b", "B", &["/docs/a", "/docs/"]),
    ]);
    let config = Config::default();
    let crawler = Crawler::new(&engine, &config.crawl, timeouts(), scope());

    let found = crawler.crawl(&seeds(&["https://x.test/docs/"])).await;

    assert_eq!(found.len(), 3);
    for url in ["https://x.test/docs/", "https://x.test/docs/a", "https://x.test/docs/b"] {
        assert_eq!(engine.visits(url), 1, "{} visited more than once", url);
    }
}

#[tokio::test]
async fn test_crawl_same_origin_walks_listing_pages() {
    let engine = MemoryEngine::new(&[
        ("https://x.test/docs/", "Home", &["/topics/"]),
        ("https://x.test/topics/", "Topics", &["/docs/deep", "https://elsewhere.test/docs/x"]),
        ("https://x.test/docs/deep", "Deep", &[]),
    ]);
    let mut config = Config::default();

    let in_scope = Crawler::new(&engine, &config.crawl, timeouts(), scope())
        .crawl(&seeds(&["https://x.test/docs/"]))
        .await;
    assert_eq!(strings(&in_scope), vec!["https://x.test/docs/"]);

    config.crawl.traversal = TraversalPolicy::SameOrigin;
    let same_origin = Crawler::new(&engine, &config.crawl, timeouts(), scope())
        .crawl(&seeds(&["https://x.test/docs/"]))
        .await;
    assert_eq!(
        strings(&same_origin),
        vec!["https://x.test/docs/", "https://x.test/docs/deep"]
    );
    assert_eq!(engine.visits("https://elsewhere.test/docs/x"), 0);
}

#[tokio::test]
async fn test_crawl_failed_page_does_not_abort() {
    let engine = MemoryEngine::new(&[
        ("https://x.test/docs/", "Home", &["/docs/missing", "/docs/a"]),
        ("https://x.test/docs/a", "A", &[]),
    ]);
    let config = Config::default();
    let crawler = Crawler::new(&engine, &config.crawl, timeouts(), scope());

    let found = crawler.crawl(&seeds(&["https://x.test/docs/"])).await;

    // The broken link was still discovered from a good page
    assert_eq!(
        strings(&found),
        vec!["https://x.test/docs/", "https://x.test/docs/a", "https://x.test/docs/missing"]
    );
    assert_eq!(engine.opened(), 3);
    assert_eq!(engine.closed(), 3);
}

#[tokio::test]
async fn test_crawl_empty_and_unreachable_seeds() {
    let engine = MemoryEngine::new(&[]);
    let config = Config::default();
    let crawler = Crawler::new(&engine, &config.crawl, timeouts(), scope());

    assert!(crawler.crawl(&[]).await.is_empty());
    assert!(crawler.crawl(&seeds(&["https://x.test/docs/"])).await.is_empty());
}

#[tokio::test]
async fn test_crawl_extra_seeds() {
    let engine = MemoryEngine::new(&[
        ("https://x.test/docs/", "Home", &[]),
        ("https://x.test/docs/get-started", "Start", &["/docs/get-started/install"]),
        ("https://x.test/docs/get-started/install", "Install", &[]),
    ]);
    let config = Config::default();
    let start = Url::parse("https://x.test/docs/").unwrap();
    let seed_list = build_seeds(&start, &["/docs/get-started".to_string()]);

    let found = Crawler::new(&engine, &config.crawl, timeouts(), scope())
        .crawl(&seed_list)
        .await;

    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn test_crawl_debug_screenshots() {
    let dir = TempDir::new().unwrap();
    let engine = docs_site();
    let config = Config::default();

    Crawler::new(&engine, &config.crawl, timeouts(), scope())
        .with_debug_screenshots(dir.path())
        .crawl(&seeds(&["https://x.test/docs/"]))
        .await;

    let shots: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|p| p
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("debug-")));
}

#[tokio::test]
async fn test_run_crawls_caches_and_exports() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site();

    let summary = run_with_engine(&engine, &config, RunOptions::default())
        .await
        .unwrap();

    assert!(!summary.from_cache);
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 0);

    let cached = load_urls(&config.cache.urls_path).unwrap().unwrap();
    assert_eq!(strings(&cached), vec!["https://x.test/docs/", "https://x.test/docs/a"]);

    let out = &config.export.output_dir;
    assert!(out.join("docs").join("docs-home.pdf").exists());
    assert!(out.join("docs_a").join("page-a.pdf").exists());

    let header = std::fs::read_to_string(out.join("docs_a").join("page-a.pdf")).unwrap();
    assert!(header.contains("/docs/a"));

    assert_eq!(engine.opened(), engine.closed());
}

#[tokio::test]
async fn test_run_uses_cache_and_skips_crawl() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site();
    save_urls(&config.cache.urls_path, &seeds(&["https://x.test/docs/a"])).unwrap();

    let summary = run_with_engine(&engine, &config, RunOptions::default())
        .await
        .unwrap();

    assert!(summary.from_cache);
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.exported, 1);
    assert_eq!(engine.visits("https://x.test/docs/"), 0);
}

#[tokio::test]
async fn test_run_fresh_ignores_cache() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site();
    save_urls(&config.cache.urls_path, &seeds(&["https://x.test/docs/a"])).unwrap();

    let options = RunOptions {
        fresh: true,
        crawl_only: true,
    };
    let summary = run_with_engine(&engine, &config, options).await.unwrap();

    assert!(!summary.from_cache);
    assert_eq!(summary.discovered, 2);
    assert_eq!(load_urls(&config.cache.urls_path).unwrap().unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_corrupt_cache_falls_back_to_crawl() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site();
    std::fs::write(&config.cache.urls_path, "[\"https://x.test/docs/\",").unwrap();

    let summary = run_with_engine(&engine, &config, RunOptions::default())
        .await
        .unwrap();

    assert!(!summary.from_cache);
    assert_eq!(summary.exported, 2);
    assert_eq!(load_urls(&config.cache.urls_path).unwrap().unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_crawl_only_writes_no_pdfs() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site();

    let options = RunOptions {
        fresh: false,
        crawl_only: true,
    };
    let summary = run_with_engine(&engine, &config, options).await.unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.exported, 0);
    assert!(!config.export.output_dir.exists());
    assert!(config.cache.urls_path.exists());
}

#[tokio::test]
async fn test_run_permanent_failure_does_not_abort_batch() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site();
    save_urls(
        &config.cache.urls_path,
        &seeds(&["https://x.test/docs/a", "https://x.test/docs/gone"]),
    )
    .unwrap();

    let summary = run_with_engine(&engine, &config, RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.exported, 1);
    assert_eq!(summary.failed, 1);
    // Three attempts for the missing page, each in its own closed session
    assert_eq!(engine.visits("https://x.test/docs/gone"), 3);
    assert_eq!(engine.opened(), engine.closed());
}

#[tokio::test]
async fn test_run_failing_selector_wait_still_crawls_and_exports() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let engine = docs_site().with_broken_selector_wait();

    let summary = run_with_engine(&engine, &config, RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 0);
    let cached = load_urls(&config.cache.urls_path).unwrap().unwrap();
    assert_eq!(
        strings(&cached),
        vec!["https://x.test/docs/", "https://x.test/docs/a"]
    );
    assert_eq!(engine.opened(), engine.closed());
}
