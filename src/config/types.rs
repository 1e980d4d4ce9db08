use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_START_URL: &str = "https://knowledgecenter.docuware.com/docs/";
pub const DEFAULT_SCOPE_PREFIX: &str = "/docs/";
pub const DEFAULT_CONTENT_SELECTOR: &str = "main, article, [data-docs]";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Main configuration structure for docprint
///
/// Every section and key is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlSettings,
    pub export: ExportSettings,
    pub browser: BrowserSettings,
    pub cache: CacheSettings,
}

/// Whether the crawler walks pages outside the scope prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalPolicy {
    /// Only in-scope links are enqueued
    #[default]
    InScope,
    /// Every same-origin link is enqueued; only in-scope ones are exported
    SameOrigin,
}

impl std::str::FromStr for TraversalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-scope" | "inscope" | "scope" => Ok(Self::InScope),
            "same-origin" | "sameorigin" | "origin" => Ok(Self::SameOrigin),
            other => Err(format!(
                "unknown traversal policy '{}', expected 'in-scope' or 'same-origin'",
                other
            )),
        }
    }
}

/// Link-discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// First page of the crawl; its origin defines the scope origin
    pub start_url: String,

    /// Path prefix that marks a page as in scope
    pub scope_prefix: String,

    /// Additional seeds, as paths on the start origin or absolute URLs
    pub extra_seeds: Vec<String>,

    pub traversal: TraversalPolicy,

    /// Best-effort marker that the primary content has rendered
    pub content_selector: String,

    /// Save a full-page screenshot of every crawled page
    pub debug_screenshots: bool,

    /// Consult robots.txt before visiting or exporting a page
    pub respect_robots: bool,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            scope_prefix: DEFAULT_SCOPE_PREFIX.to_string(),
            extra_seeds: Vec::new(),
            traversal: TraversalPolicy::default(),
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            debug_screenshots: false,
            respect_robots: false,
        }
    }
}

impl CrawlSettings {
    /// Selector awaited after each navigation: the content marker or any
    /// anchor pointing into the scope
    pub fn marker_selector(&self) -> String {
        format!(
            r#"a[href*="{}"], {}"#,
            self.scope_prefix.replace('"', "\\\""),
            self.content_selector
        )
    }
}

/// PDF export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportSettings {
    /// Number of concurrent export workers
    pub concurrency: u32,

    /// Pause each worker takes after an export (milliseconds)
    pub pause_ms: u64,

    /// Root directory for rendered PDFs
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            pause_ms: 800,
            output_dir: PathBuf::from("./pdf-out"),
        }
    }
}

impl ExportSettings {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserSettings {
    pub headless: bool,

    /// Chrome/Chromium binary; auto-detected when unset
    pub executable: Option<PathBuf>,

    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub locale: String,

    pub navigation_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub selector_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1366,
            viewport_height: 768,
            locale: "en-US".to_string(),
            navigation_timeout_secs: 60,
            idle_timeout_secs: 30,
            selector_timeout_secs: 20,
        }
    }
}

/// Per-call timeouts for the settle sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub navigation: Duration,
    pub idle: Duration,
    pub selector: Duration,
}

impl BrowserSettings {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            navigation: Duration::from_secs(self.navigation_timeout_secs),
            idle: Duration::from_secs(self.idle_timeout_secs),
            selector: Duration::from_secs(self.selector_timeout_secs),
        }
    }
}

/// Discovered-URL cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheSettings {
    pub urls_path: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            urls_path: PathBuf::from("./urls.json"),
        }
    }
}

/// Values taken from the environment or the command line
///
/// Signed integers are accepted so that out-of-range values can be clamped
/// rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub start_url: Option<String>,
    pub scope_prefix: Option<String>,
    pub extra_seeds: Option<Vec<String>>,
    pub traversal: Option<TraversalPolicy>,
    pub concurrency: Option<i64>,
    pub pause_ms: Option<i64>,
    pub output_dir: Option<PathBuf>,
    pub urls_path: Option<PathBuf>,
    pub executable: Option<PathBuf>,
    pub headful: bool,
    pub debug_screenshots: bool,
    pub respect_robots: bool,
}
