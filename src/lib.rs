//! docprint: documentation site to PDF printer
//!
//! This crate crawls a documentation site restricted to a URL path scope,
//! discovers every in-scope page reachable through hyperlinks, and prints each
//! page to PDF through a headless browser.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod export;
pub mod robots;
pub mod run;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for docprint operations
#[derive(Debug, Error)]
pub enum DocprintError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser engine error: {0}")]
    Engine(#[from] browser::EngineError),

    #[error("URL cache error: {0}")]
    Cache(#[from] storage::CacheError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Robots.txt error: {0}")]
    Robots(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for docprint operations
pub type Result<T> = std::result::Result<T, DocprintError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crate::url::{normalize, NormalizedUrl, Scope};
