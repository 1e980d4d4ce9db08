//! PDF export module
//!
//! This module turns the discovered URL list into PDFs:
//! - Output path derivation from URL path and page title
//! - Fixed-backoff retry policy
//! - The per-page exporter
//! - The cooperative worker pool that drives it

mod exporter;
mod filename;
mod pool;
mod retry;

pub use exporter::{ExportOutcome, Exporter, LAYOUT_CSS};
pub use filename::{output_dir_for, pdf_path, sanitize_title, DEFAULT_TITLE, MAX_NAME_LEN};
pub use pool::WorkerPool;
pub use retry::{RetryDecision, RetryPolicy, DEFAULT_BACKOFF, MAX_RETRIES};
