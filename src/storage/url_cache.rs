//! JSON cache of the discovered URL list
//!
//! The file is a pretty-printed JSON array of URL strings in sorted order.
//! It is all-or-nothing: a present, readable cache replaces the crawl.

use crate::url::NormalizedUrl;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing the URL cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed cache file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL in cache: {0}")]
    InvalidEntry(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Loads the cached URL list
///
/// # Returns
///
/// * `Ok(Some(urls))` - The cache exists; URLs are sorted and de-duplicated
/// * `Ok(None)` - No cache file
/// * `Err(CacheError)` - The file exists but cannot be read or parsed
pub fn load_urls(path: &Path) -> CacheResult<Option<Vec<NormalizedUrl>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let raw: Vec<String> = serde_json::from_str(&content)?;

    let mut urls = BTreeSet::new();
    for entry in raw {
        let url = NormalizedUrl::parse(&entry)
            .map_err(|e| CacheError::InvalidEntry(format!("{}: {}", entry, e)))?;
        urls.insert(url);
    }

    Ok(Some(urls.into_iter().collect()))
}

/// Writes the URL list as a pretty-printed JSON array
///
/// Missing parent directories are created.
pub fn save_urls(path: &Path, urls: &[NormalizedUrl]) -> CacheResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(urls)?;
    std::fs::write(path, json)?;
    Ok(())
}
