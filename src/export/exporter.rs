//! Page exporter: one URL to one PDF, with bounded retries
//!
//! Each attempt runs in a fresh session: settle the page, hide the site
//! chrome, switch to print media, then print to the path derived from the
//! URL and title.

use crate::browser::{load_page, BrowserEngine, EngineResult, PageSession, PdfOptions};
use crate::config::Timeouts;
use crate::export::filename::pdf_path;
use crate::export::retry::{RetryDecision, RetryPolicy};
use crate::url::NormalizedUrl;
use std::path::PathBuf;

/// Stylesheet injected before printing
///
/// Hides header, navigation, sidebar, table of contents and footer, and lets
/// the content use the full page width.
pub const LAYOUT_CSS: &str = r#"
header, nav, .sidebar, .toc, .footer,
[class*="Header"], [class*="Nav"], [class*="Sidebar"], [class*="Footer"] { display: none !important; }
main, article, [data-docs], [class*="Content"] { width: 100% !important; max-width: 100% !important; }
body { margin: 0 !important; }
"#;

/// Final state of one export job
#[derive(Debug)]
pub enum ExportOutcome {
    Written { path: PathBuf, attempts: u32 },
    Failed { attempts: u32, error: String },
}

impl ExportOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Written { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Renders pages to PDF through a browser engine
pub struct Exporter<'a, E: BrowserEngine> {
    engine: &'a E,
    output_root: PathBuf,
    timeouts: Timeouts,
    marker_selector: String,
    retry: RetryPolicy,
}

impl<'a, E: BrowserEngine> Exporter<'a, E> {
    /// Creates an exporter writing under `output_root`
    pub fn new(
        engine: &'a E,
        output_root: impl Into<PathBuf>,
        timeouts: Timeouts,
        marker_selector: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            output_root: output_root.into(),
            timeouts,
            marker_selector: marker_selector.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Exports one page, retrying the whole sequence on any failure
    ///
    /// Never panics and never returns an error: the final state is reported
    /// in the outcome and logged.
    pub async fn export(&self, url: &NormalizedUrl) -> ExportOutcome {
        let max = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            match self.attempt(url).await {
                Ok(path) => {
                    tracing::info!("[pdf] OK {} ({}/{})", path.display(), attempt, max);
                    return ExportOutcome::Written {
                        path,
                        attempts: attempt,
                    };
                }
                Err(e) => match self.retry.decide(attempt) {
                    RetryDecision::Retry { delay } => {
                        tracing::warn!("[pdf] retry {} [{}/{}]: {}", url, attempt, max, e);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        attempt += 1;
                    }
                    RetryDecision::GiveUp => {
                        tracing::error!("[pdf] FAIL {} after {} attempts: {}", url, attempt, e);
                        return ExportOutcome::Failed {
                            attempts: attempt,
                            error: e.to_string(),
                        };
                    }
                },
            }
        }
    }

    /// One attempt in a fresh session; the session is closed on every path
    async fn attempt(&self, url: &NormalizedUrl) -> EngineResult<PathBuf> {
        let session = self.engine.open_session().await?;
        let result = self.render(&session, url).await;

        if let Err(e) = session.close().await {
            tracing::debug!("Failed to close session for {}: {}", url, e);
        }

        result
    }

    async fn render(&self, session: &E::Session, url: &NormalizedUrl) -> EngineResult<PathBuf> {
        load_page(session, url.as_url(), &self.timeouts, &self.marker_selector).await?;

        session.inject_style(LAYOUT_CSS).await?;
        session.emulate_print_media().await?;

        let title = match session.title().await {
            Ok(title) => title,
            Err(e) => {
                tracing::debug!("No title for {}: {}", url, e);
                None
            }
        };

        let path = pdf_path(&self.output_root, url, title.as_deref());
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let options = PdfOptions::a4_with_overlay(url.path());
        session.print_to_pdf(&path, &options).await?;

        Ok(path)
    }
}
