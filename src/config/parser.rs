use crate::config::types::{Config, Overrides};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads a configuration file, applies overrides, and validates the result
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
/// * `overrides` - Values from the environment and the command line
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use docprint::config::{load_config, Overrides};
///
/// let config = load_config(Some(Path::new("docprint.toml")), &Overrides::default()).unwrap();
/// println!("Scope prefix: {}", config.crawl.scope_prefix);
/// ```
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config_file(path)?,
        None => Config::default(),
    };

    apply_overrides(&mut config, overrides);

    validate(&config)?;

    Ok(config)
}

/// Reads and parses a TOML configuration file without validating it
pub fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Applies environment and command-line values on top of the file values
///
/// Concurrency is clamped to at least 1 and the pause to at least 0.
pub fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(start_url) = &overrides.start_url {
        config.crawl.start_url = start_url.clone();
    }
    if let Some(prefix) = &overrides.scope_prefix {
        config.crawl.scope_prefix = prefix.clone();
    }
    if let Some(seeds) = &overrides.extra_seeds {
        config.crawl.extra_seeds = seeds.clone();
    }
    if let Some(traversal) = overrides.traversal {
        config.crawl.traversal = traversal;
    }
    if overrides.debug_screenshots {
        config.crawl.debug_screenshots = true;
    }
    if overrides.respect_robots {
        config.crawl.respect_robots = true;
    }

    if let Some(concurrency) = overrides.concurrency {
        if concurrency < 1 {
            tracing::warn!("concurrency {} is below 1, using 1", concurrency);
        }
        config.export.concurrency = concurrency.clamp(1, i64::from(u32::MAX)) as u32;
    }
    if let Some(pause_ms) = overrides.pause_ms {
        config.export.pause_ms = pause_ms.max(0) as u64;
    }
    if let Some(dir) = &overrides.output_dir {
        config.export.output_dir = dir.clone();
    }

    if let Some(path) = &overrides.urls_path {
        config.cache.urls_path = path.clone();
    }

    if let Some(executable) = &overrides.executable {
        config.browser.executable = Some(executable.clone());
    }
    if overrides.headful {
        config.browser.headless = false;
    }
}

/// Splits a comma-separated seed list, dropping empty entries
pub fn split_seed_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
