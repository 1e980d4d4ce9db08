//! Crawler module for in-scope page discovery
//!
//! This module contains the link-discovery logic, including:
//! - Seed list construction
//! - The FIFO frontier and visited set
//! - Anchor extraction from rendered HTML
//! - The breadth-first crawl loop

mod coordinator;
mod frontier;
mod parser;

pub use coordinator::{debug_screenshot_path, Crawler};
pub use frontier::Frontier;
pub use parser::extract_hrefs;

use crate::url::NormalizedUrl;
use url::Url;

/// Builds the ordered seed list: the start URL, then each extra seed
///
/// Extra seeds may be paths (resolved against the start URL) or absolute
/// URLs. Seeds that fail to resolve are logged and dropped; duplicates keep
/// their first position.
pub fn build_seeds(start_url: &Url, extra_seeds: &[String]) -> Vec<NormalizedUrl> {
    let mut seeds: Vec<NormalizedUrl> = Vec::with_capacity(extra_seeds.len() + 1);
    let start = NormalizedUrl::from_url(start_url.clone());
    seeds.push(start);

    for raw in extra_seeds {
        match crate::url::normalize(raw, start_url) {
            Some(seed) => {
                if !seeds.contains(&seed) {
                    seeds.push(seed);
                }
            }
            None => tracing::warn!("Ignoring unresolvable seed: {}", raw),
        }
    }

    seeds
}
