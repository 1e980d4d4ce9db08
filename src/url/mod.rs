//! URL handling module for docprint
//!
//! This module provides URL normalization and the scope test that decides
//! which discovered pages are exported.

mod normalize;

pub use normalize::{normalize, NormalizedUrl};

use url::{Origin, Url};

/// The crawl scope: one origin plus a path prefix
///
/// A URL is in scope when its origin equals the scope origin and its path
/// starts with the prefix. The origin is carried explicitly so the crawler can
/// be pointed at any synthetic host in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    origin: Origin,
    path_prefix: String,
}

impl Scope {
    /// Creates a scope from an origin and a path prefix
    pub fn new(origin: Origin, path_prefix: impl Into<String>) -> Self {
        Self {
            origin,
            path_prefix: path_prefix.into(),
        }
    }

    /// Creates a scope using the origin of `start_url`
    ///
    /// # Examples
    ///
    /// ```
    /// use docprint::url::{NormalizedUrl, Scope};
    /// use url::Url;
    ///
    /// let start = Url::parse("https://x.test/docs/").unwrap();
    /// let scope = Scope::from_start_url(&start, "/docs/");
    /// assert!(scope.contains(&NormalizedUrl::parse("https://x.test/docs/a").unwrap()));
    /// assert!(!scope.contains(&NormalizedUrl::parse("https://x.test/other/b").unwrap()));
    /// ```
    pub fn from_start_url(start_url: &Url, path_prefix: impl Into<String>) -> Self {
        Self::new(start_url.origin(), path_prefix)
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Returns true if the URL shares the scope origin
    pub fn same_origin(&self, url: &NormalizedUrl) -> bool {
        url.as_url().origin() == self.origin
    }

    /// Returns true if the URL is same-origin and under the path prefix
    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.same_origin(url) && url.path().starts_with(&self.path_prefix)
    }
}
