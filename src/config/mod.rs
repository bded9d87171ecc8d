//! Configuration module for Sumi-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key except `mirror.base-url` has a default, so a configuration can also
//! be assembled from command-line flags alone and then passed to [`validate`].
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring {} with {} workers", config.mirror.base_url, config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, MirrorConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{config_hash, load_config, read_config};
pub use validation::validate;
