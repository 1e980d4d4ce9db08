//! Storage module for persisting crawl results
//!
//! The only persisted state is the discovered URL list, kept as a JSON file
//! so a later run can skip the crawl.

mod url_cache;

pub use url_cache::{load_urls, save_urls, CacheError, CacheResult};
