//! chromiumoxide-backed browser engine
//!
//! One Chromium process is shared by the whole run. Every session gets its own
//! browser context (`Target.createBrowserContext`), which is disposed when the
//! session closes.

use super::{mm_to_inches, BrowserEngine, EngineError, EngineResult, PageSession, PdfOptions, WaitOutcome};
use crate::config::BrowserSettings;
use crate::crawler::extract_hrefs;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{BrowserContextId, CloseParams};
use chromiumoxide::cdp::browser_protocol::emulation::SetEmulatedMediaParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use url::Url;

/// Interval between readiness checks
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long the resource count must stay unchanged to call the page idle
const IDLE_QUIET_PERIOD: Duration = Duration::from_millis(500);

const READY_STATE_JS: &str =
    "[document.readyState, performance.getEntriesByType('resource').length]";

impl From<CdpError> for EngineError {
    fn from(e: CdpError) -> Self {
        EngineError::Protocol(e.to_string())
    }
}

/// Deadline for a single CDP command
///
/// Navigation is the slowest command the engine issues, so every command
/// gets the navigation timeout.
fn cdp_request_timeout(settings: &BrowserSettings) -> Duration {
    settings.timeouts().navigation
}

/// Polls the CDP event stream until it ends, returning the number of events seen
///
/// Errors are per-message and do not stop the loop.
async fn drive_events<S, T, E>(events: &mut S) -> usize
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut seen = 0;
    while let Some(event) = events.next().await {
        seen += 1;
        if let Err(e) = event {
            tracing::debug!("Browser handler error: {}", e);
        }
    }
    tracing::debug!("Browser handler stopped after {} events", seen);
    seen
}

/// Shared headless Chromium instance
pub struct ChromiumEngine {
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    user_agent: String,
}

impl ChromiumEngine {
    /// Launches Chromium and starts driving its CDP event stream
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Launch` when no browser can be started; the run
    /// cannot continue without one.
    pub async fn launch(settings: &BrowserSettings) -> EngineResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(cdp_request_timeout(settings))
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--lang={}", settings.locale));

        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }

        let config = builder.build().map_err(EngineError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| EngineError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            drive_events(&mut handler).await;
        });

        tracing::info!(
            "Launched browser ({}, {}x{})",
            if settings.headless { "headless" } else { "headful" },
            settings.viewport_width,
            settings.viewport_height
        );

        Ok(Self {
            browser: Arc::new(browser),
            handler_task,
            user_agent: settings.user_agent.clone(),
        })
    }

    /// Asks the browser to exit and waits for the event loop to finish
    pub async fn close(self) -> EngineResult<()> {
        if let Err(e) = self.browser.execute(CloseParams::default()).await {
            tracing::warn!("Browser did not close cleanly: {}", e);
        }

        if timeout(Duration::from_secs(5), self.handler_task).await.is_err() {
            tracing::warn!("Browser handler did not stop within 5s");
        }

        Ok(())
    }

    async fn dispose_context(&self, context: BrowserContextId) {
        if let Err(e) = self
            .browser
            .execute(DisposeBrowserContextParams::new(context))
            .await
        {
            tracing::debug!("Failed to dispose browser context: {}", e);
        }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    type Session = ChromiumSession;

    async fn open_session(&self) -> EngineResult<ChromiumSession> {
        let context = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(EngineError::Protocol)?;

        let page = match self.browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                self.dispose_context(context).await;
                return Err(e.into());
            }
        };

        if let Err(e) = page.set_user_agent(self.user_agent.as_str()).await {
            tracing::debug!("Failed to set user agent: {}", e);
        }

        Ok(ChromiumSession {
            browser: Arc::clone(&self.browser),
            context,
            page,
        })
    }
}

/// One browser context with a single page
pub struct ChromiumSession {
    browser: Arc<Browser>,
    context: BrowserContextId,
    page: Page,
}

impl ChromiumSession {
    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: String) -> EngineResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| EngineError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| EngineError::Script(e.to_string()))
    }

    /// Polls until the document is complete and no new resources have
    /// started for [`IDLE_QUIET_PERIOD`]
    async fn poll_network_idle(&self) -> WaitOutcome {
        let mut last_count: Option<u64> = None;
        let mut quiet_since = Instant::now();

        loop {
            let (ready_state, count) =
                match self.evaluate::<(String, u64)>(READY_STATE_JS.to_string()).await {
                    Ok(sample) => sample,
                    Err(e) => return WaitOutcome::Failed(e),
                };

            let now = Instant::now();
            if last_count != Some(count) {
                last_count = Some(count);
                quiet_since = now;
            } else if ready_state == "complete" && now.duration_since(quiet_since) >= IDLE_QUIET_PERIOD {
                return WaitOutcome::Ready;
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Polls until `script` evaluates to true; an invalid selector fails
    async fn poll_selector(&self, script: String) -> WaitOutcome {
        loop {
            match self.evaluate::<bool>(script.clone()).await {
                Ok(true) => return WaitOutcome::Ready,
                Ok(false) => {}
                Err(e) => return WaitOutcome::Failed(e),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

fn js_string(value: &str) -> String {
    // A JSON string literal is a valid JavaScript string literal
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&self, url: &Url, limit: Duration) -> EngineResult<()> {
        match timeout(limit, self.page.goto(url.as_str())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(EngineError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(EngineError::Timeout {
                operation: "navigation",
                after: limit,
            }),
        }
    }

    async fn wait_for_network_idle(&self, limit: Duration) -> WaitOutcome {
        timeout(limit, self.poll_network_idle())
            .await
            .unwrap_or(WaitOutcome::TimedOut)
    }

    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> WaitOutcome {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        timeout(limit, self.poll_selector(script))
            .await
            .unwrap_or(WaitOutcome::TimedOut)
    }

    async fn inject_style(&self, css: &str) -> EngineResult<()> {
        let script = format!(
            "(() => {{ const s = document.createElement('style'); s.textContent = {}; \
             (document.head || document.documentElement).appendChild(s); return true; }})()",
            js_string(css)
        );
        self.evaluate::<bool>(script).await.map(|_| ())
    }

    async fn emulate_print_media(&self) -> EngineResult<()> {
        self.page
            .execute(SetEmulatedMediaParams::builder().media("print").build())
            .await?;
        Ok(())
    }

    async fn title(&self) -> EngineResult<Option<String>> {
        Ok(self.page.get_title().await?)
    }

    async fn anchor_hrefs(&self) -> EngineResult<Vec<String>> {
        let html = self.page.content().await?;
        Ok(extract_hrefs(&html))
    }

    async fn screenshot(&self, path: &Path) -> EngineResult<()> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;
        Ok(())
    }

    async fn print_to_pdf(&self, path: &Path, options: &PdfOptions) -> EngineResult<()> {
        let params = PrintToPdfParams::builder()
            .print_background(options.print_background)
            .paper_width(options.paper_width)
            .paper_height(options.paper_height)
            .margin_top(mm_to_inches(options.margin_top_mm))
            .margin_right(mm_to_inches(options.margin_right_mm))
            .margin_bottom(mm_to_inches(options.margin_bottom_mm))
            .margin_left(mm_to_inches(options.margin_left_mm))
            .display_header_footer(true)
            .header_template(options.header_template.clone())
            .footer_template(options.footer_template.clone())
            .build();

        self.page
            .save_pdf(params, path)
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;
        Ok(())
    }

    async fn close(self) -> EngineResult<()> {
        let ChromiumSession {
            browser,
            context,
            page,
        } = self;

        let closed = page.close().await;

        if let Err(e) = browser
            .execute(DisposeBrowserContextParams::new(context))
            .await
        {
            tracing::debug!("Failed to dispose browser context: {}", e);
        }

        closed.map_err(EngineError::from)
    }
}
