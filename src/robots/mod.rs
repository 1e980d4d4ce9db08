//! Robots.txt handling module
//!
//! When enabled, the crawler skips pages robots.txt disallows and the export
//! pool paces itself by the site's crawl delay.

mod parser;

pub use parser::ParsedRobots;

use crate::DocprintError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Product token matched against robots.txt user-agent groups
pub const ROBOTS_AGENT: &str = "docprint";

/// Robots policy for the crawled origin
#[derive(Debug, Clone)]
pub struct RobotsGate {
    robots: ParsedRobots,
}

impl RobotsGate {
    pub fn new(robots: ParsedRobots) -> Self {
        Self { robots }
    }

    pub fn allow_all() -> Self {
        Self::new(ParsedRobots::allow_all())
    }

    /// Checks if a URL may be visited
    pub fn allows(&self, url: &Url) -> bool {
        self.robots.is_allowed(url.as_str(), ROBOTS_AGENT)
    }

    /// Crawl delay requested by the site, if any
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.robots
            .crawl_delay(ROBOTS_AGENT)
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Fetches and parses robots.txt for the origin of `site`
///
/// A non-success status (typically 404) means there is no policy and yields
/// an allow-all result.
///
/// # Errors
///
/// Returns `DocprintError::Robots` on network failure.
pub async fn fetch_robots(
    client: &Client,
    site: &Url,
    user_agent: &str,
) -> Result<ParsedRobots, DocprintError> {
    let robots_url = site.join("/robots.txt")?;

    let response = client
        .get(robots_url.as_str())
        .header(reqwest::header::USER_AGENT, user_agent)
        .send()
        .await
        .map_err(|e| DocprintError::Robots(format!("{}: {}", robots_url, e)))?;

    if !response.status().is_success() {
        tracing::debug!(
            "No robots.txt at {} (HTTP {}), allowing all",
            robots_url,
            response.status()
        );
        return Ok(ParsedRobots::allow_all());
    }

    let body = response
        .text()
        .await
        .map_err(|e| DocprintError::Robots(format!("{}: {}", robots_url, e)))?;

    Ok(ParsedRobots::from_content(&body))
}

/// Builds the HTTP client used for robots.txt
pub fn build_http_client() -> Result<Client, DocprintError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| DocprintError::Robots(format!("Failed to build HTTP client: {}", e)))
}
