//! In-memory browser engine for unit tests
//!
//! Pages are registered by URL with a title and anchor list. Navigation to an
//! unknown URL fails; a URL can also be told to fail its next N navigations.

use super::{BrowserEngine, EngineError, EngineResult, PageSession, PdfOptions, WaitOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: Option<String>,
    pub hrefs: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pages: Mutex<HashMap<String, FakePage>>,
    failures: Mutex<HashMap<String, u32>>,
    pdf_failures: Mutex<HashMap<String, u32>>,
    pub navigations: Mutex<Vec<String>>,
    pub pdfs: Mutex<Vec<PathBuf>>,
    broken_waits: AtomicBool,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    pub state: Arc<FakeState>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, title: Option<&str>, hrefs: &[&str]) -> Self {
        self.state.pages.lock().unwrap().insert(
            url.to_string(),
            FakePage {
                title: title.map(str::to_string),
                hrefs: hrefs.iter().map(|h| h.to_string()).collect(),
            },
        );
        self
    }

    /// Fails the next `times` navigations to `url`
    pub fn failing(self, url: &str, times: u32) -> Self {
        self.state.failures.lock().unwrap().insert(url.to_string(), times);
        self
    }

    /// Fails the next `times` PDF renders for `url`
    pub fn failing_pdf(self, url: &str, times: u32) -> Self {
        self.state.pdf_failures.lock().unwrap().insert(url.to_string(), times);
        self
    }

    /// Makes every idle and selector wait fail with a script error
    pub fn broken_waits(self) -> Self {
        self.state.broken_waits.store(true, Ordering::SeqCst);
        self
    }

    pub fn navigations_to(&self, url: &str) -> usize {
        self.state
            .navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }
}

fn take_failure(map: &Mutex<HashMap<String, u32>>, url: &str) -> bool {
    let mut map = map.lock().unwrap();
    match map.get_mut(url) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

pub struct FakeSession {
    state: Arc<FakeState>,
    current: Mutex<Option<String>>,
}

impl FakeSession {
    fn current_page(&self) -> EngineResult<(String, FakePage)> {
        let current = self
            .current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| EngineError::Script("no document".to_string()))?;
        let page = self
            .state
            .pages
            .lock()
            .unwrap()
            .get(&current)
            .cloned()
            .unwrap_or_default();
        Ok((current, page))
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    type Session = FakeSession;

    async fn open_session(&self) -> EngineResult<FakeSession> {
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            state: Arc::clone(&self.state),
            current: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &Url, _timeout: Duration) -> EngineResult<()> {
        let url = url.as_str().to_string();
        self.state.navigations.lock().unwrap().push(url.clone());

        if take_failure(&self.state.failures, &url)
            || !self.state.pages.lock().unwrap().contains_key(&url)
        {
            return Err(EngineError::Navigation {
                url,
                message: "net::ERR_FAILED".to_string(),
            });
        }

        *self.current.lock().unwrap() = Some(url);
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> WaitOutcome {
        if self.state.broken_waits.load(Ordering::SeqCst) {
            return WaitOutcome::Failed(EngineError::Script("network idle check failed".to_string()));
        }
        WaitOutcome::TimedOut
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> WaitOutcome {
        if self.state.broken_waits.load(Ordering::SeqCst) {
            return WaitOutcome::Failed(EngineError::Script(format!(
                "SyntaxError: '{}' is not a valid selector",
                selector
            )));
        }
        WaitOutcome::Ready
    }

    async fn inject_style(&self, _css: &str) -> EngineResult<()> {
        Ok(())
    }

    async fn emulate_print_media(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn title(&self) -> EngineResult<Option<String>> {
        Ok(self.current_page()?.1.title)
    }

    async fn anchor_hrefs(&self) -> EngineResult<Vec<String>> {
        Ok(self.current_page()?.1.hrefs)
    }

    async fn screenshot(&self, path: &Path) -> EngineResult<()> {
        tokio::fs::write(path, b"PNG").await?;
        Ok(())
    }

    async fn print_to_pdf(&self, path: &Path, _options: &PdfOptions) -> EngineResult<()> {
        let (url, _) = self.current_page()?;
        if take_failure(&self.state.pdf_failures, &url) {
            return Err(EngineError::Render(format!("print failed for {}", url)));
        }
        tokio::fs::write(path, b"%PDF-1.4").await?;
        self.state.pdfs.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn close(self) -> EngineResult<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
