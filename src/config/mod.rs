//! Configuration module for docprint
//!
//! Settings come from built-in defaults, an optional TOML file, the
//! environment, and the command line, in that order of precedence.
//!
//! # Example
//!
//! ```no_run
//! use docprint::config::{load_config, Overrides};
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("docprint.toml")), &Overrides::default()).unwrap();
//! println!("Exporting with {} workers", config.export.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserSettings, CacheSettings, Config, CrawlSettings, ExportSettings, Overrides, Timeouts,
    TraversalPolicy, DEFAULT_CONTENT_SELECTOR, DEFAULT_SCOPE_PREFIX, DEFAULT_START_URL,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{apply_overrides, load_config, parse_config_file, split_seed_list};
pub use validation::validate;
