use crate::config::types::{BrowserSettings, CacheSettings, Config, CrawlSettings, ExportSettings};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_export_settings(&config.export)?;
    validate_browser_settings(&config.browser)?;
    validate_cache_settings(&config.cache)?;
    Ok(())
}

/// Validates link-discovery settings
fn validate_crawl_settings(config: &CrawlSettings) -> Result<(), ConfigError> {
    let start = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", config.start_url, e))
    })?;

    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url must use http or https, got '{}'",
            start.scheme()
        )));
    }

    if start.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' has no host",
            config.start_url
        )));
    }

    if !config.scope_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "scope_prefix must start with '/', got '{}'",
            config.scope_prefix
        )));
    }

    for seed in &config.extra_seeds {
        start.join(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid extra seed '{}': {}", seed, e))
        })?;
    }

    if config.content_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "content_selector cannot be empty".to_string(),
        ));
    }

    // The browser evaluates the combined marker selector; reject what it cannot parse
    let marker = config.marker_selector();
    if let Err(e) = scraper::Selector::parse(&marker) {
        return Err(ConfigError::Validation(format!(
            "content_selector '{}' is not a valid CSS selector: {}",
            config.content_selector, e
        )));
    }

    Ok(())
}

/// Validates export settings
fn validate_export_settings(config: &ExportSettings) -> Result<(), ConfigError> {
    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates browser settings
fn validate_browser_settings(config: &BrowserSettings) -> Result<(), ConfigError> {
    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    for (name, secs) in [
        ("navigation_timeout_secs", config.navigation_timeout_secs),
        ("idle_timeout_secs", config.idle_timeout_secs),
        ("selector_timeout_secs", config.selector_timeout_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates cache settings
fn validate_cache_settings(config: &CacheSettings) -> Result<(), ConfigError> {
    if config.urls_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "urls_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
