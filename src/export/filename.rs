//! Output path derivation for rendered pages
//!
//! A page lands at `<root>/<path_with_underscores>/<slug>.pdf`, where the slug
//! comes from the page title.

use crate::url::NormalizedUrl;
use std::path::{Path, PathBuf};

/// Name used when a page has no usable title
pub const DEFAULT_TITLE: &str = "page";

/// Maximum slug length in characters
pub const MAX_NAME_LEN: usize = 180;

/// Turns a page title into a file-name slug
///
/// Lowercases, maps anything outside `[a-z0-9-_. ]` and any whitespace to
/// `-`, collapses repeated `-`, truncates to [`MAX_NAME_LEN`] and trims `-`
/// from both ends. Falls back to [`DEFAULT_TITLE`] when nothing is left.
///
/// # Examples
///
/// ```
/// use docprint::export::sanitize_title;
///
/// assert_eq!(sanitize_title("Hello, World! / Test"), "hello-world-test");
/// assert_eq!(sanitize_title("   "), "page");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_dash = false;

    for ch in title.to_lowercase().chars() {
        let mapped = match ch {
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => c,
            '_' | '.' => ch,
            _ => '-',
        };
        if mapped == '-' {
            if !prev_dash {
                out.push('-');
                prev_dash = true;
            }
        } else {
            out.push(mapped);
            prev_dash = false;
        }
    }

    let truncated: String = out.chars().take(MAX_NAME_LEN).collect();
    let slug = truncated.trim_matches('-');
    if slug.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        slug.to_string()
    }
}

/// Directory for a page: its URL path with outer slashes trimmed and inner
/// slashes replaced by `_`, under `root`
///
/// The site root (`/`) maps to `root` itself.
pub fn output_dir_for(root: &Path, url: &NormalizedUrl) -> PathBuf {
    let name = url.path().trim_matches('/').replace('/', "_");
    if name.is_empty() {
        root.to_path_buf()
    } else {
        root.join(name)
    }
}

/// Full PDF path for a page with the given (unsanitized) title
pub fn pdf_path(root: &Path, url: &NormalizedUrl, title: Option<&str>) -> PathBuf {
    let slug = sanitize_title(title.unwrap_or(DEFAULT_TITLE));
    output_dir_for(root, url).join(format!("{}.pdf", slug))
}
