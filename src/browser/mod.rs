//! Headless browser capability surface
//!
//! The crawler and exporter only talk to the browser through the
//! [`BrowserEngine`] and [`PageSession`] traits:
//! - open an isolated session (own cookies and storage) with one page
//! - navigate, then wait for network idle and a content marker
//! - inject styles, switch to print media, read the title and anchors
//! - capture screenshots and print to PDF
//!
//! [`ChromiumEngine`] is the production implementation over chromiumoxide.

mod chromium;
#[cfg(test)]
pub(crate) mod fake;

pub use chromium::{ChromiumEngine, ChromiumSession};

use crate::config::Timeouts;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by the browser engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Outcome of a best-effort wait
///
/// Neither `TimedOut` nor `Failed` stops a page load; they are only logged.
#[derive(Debug)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
    Failed(EngineError),
}

/// Paper, margin and overlay options for printing a page
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Paper width in inches
    pub paper_width: f64,
    /// Paper height in inches
    pub paper_height: f64,
    /// Margins in millimetres
    pub margin_top_mm: f64,
    pub margin_right_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub print_background: bool,
    pub header_template: String,
    pub footer_template: String,
}

impl PdfOptions {
    pub const A4_WIDTH_IN: f64 = 8.27;
    pub const A4_HEIGHT_IN: f64 = 11.69;

    /// A4 with the fixed docprint margins and a header/footer overlay
    ///
    /// The header shows `path_label` right-aligned; the footer shows the print
    /// date and a `Page N/M` counter filled in by the browser.
    pub fn a4_with_overlay(path_label: &str) -> Self {
        Self {
            paper_width: Self::A4_WIDTH_IN,
            paper_height: Self::A4_HEIGHT_IN,
            margin_top_mm: 14.0,
            margin_right_mm: 12.0,
            margin_bottom_mm: 16.0,
            margin_left_mm: 12.0,
            print_background: true,
            header_template: format!(
                r#"<div style="font-size:9px;width:100%;text-align:right;padding-right:8px;color:#666;">{}</div>"#,
                escape_html(path_label)
            ),
            footer_template: concat!(
                r#"<div style="font-size:9px;width:100%;padding:0 8px;color:#666;display:flex;justify-content:space-between;">"#,
                r#"<span class="date"></span>"#,
                r#"<span>Page <span class="pageNumber"></span>/<span class="totalPages"></span></span>"#,
                "</div>"
            )
            .to_string(),
        }
    }
}

/// Converts millimetres to inches, the unit the print protocol expects
pub fn mm_to_inches(mm: f64) -> f64 {
    mm / 25.4
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A headless browser that hands out isolated page sessions
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    type Session: PageSession;

    /// Opens a fresh browsing context with a single blank page
    async fn open_session(&self) -> EngineResult<Self::Session>;
}

/// One isolated browsing context and its page
///
/// Every session must be closed with [`PageSession::close`], on success and
/// failure paths alike, so the context is disposed.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigates and waits for the load event; the one hard failure
    async fn navigate(&self, url: &Url, timeout: Duration) -> EngineResult<()>;

    async fn wait_for_network_idle(&self, timeout: Duration) -> WaitOutcome;

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> WaitOutcome;

    /// Appends a stylesheet to the current document
    async fn inject_style(&self, css: &str) -> EngineResult<()>;

    async fn emulate_print_media(&self) -> EngineResult<()>;

    async fn title(&self) -> EngineResult<Option<String>>;

    /// Raw `href` attribute values of every anchor in the document
    async fn anchor_hrefs(&self) -> EngineResult<Vec<String>>;

    async fn screenshot(&self, path: &Path) -> EngineResult<()>;

    async fn print_to_pdf(&self, path: &Path, options: &PdfOptions) -> EngineResult<()>;

    async fn close(self) -> EngineResult<()>;
}

/// Navigates and lets the page settle
///
/// Navigation errors propagate. The idle and selector waits are best-effort:
/// a timeout is logged at debug level, a failed wait at warn level, and the
/// load carries on either way.
pub async fn load_page<S: PageSession>(
    session: &S,
    url: &Url,
    timeouts: &Timeouts,
    marker_selector: &str,
) -> EngineResult<()> {
    session.navigate(url, timeouts.navigation).await?;
    tracing::debug!("[goto] OK {}", url);

    match session.wait_for_network_idle(timeouts.idle).await {
        WaitOutcome::Ready => {}
        WaitOutcome::TimedOut => {
            tracing::debug!("[idle] timed out after {:?} at {}", timeouts.idle, url)
        }
        WaitOutcome::Failed(e) => tracing::warn!("[idle] wait failed at {}: {}", url, e),
    }

    match session
        .wait_for_selector(marker_selector, timeouts.selector)
        .await
    {
        WaitOutcome::Ready => {}
        WaitOutcome::TimedOut => tracing::debug!(
            "[selector] no content marker within {:?} at {}",
            timeouts.selector,
            url
        ),
        WaitOutcome::Failed(e) => tracing::warn!("[selector] wait failed at {}: {}", url, e),
    }

    Ok(())
}
