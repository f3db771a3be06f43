//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The ordered `[[program]]` list is what the orchestrator iterates.
//!
//! # Example
//!
//! ```no_run
//! use pinout_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, ProgramConfig, SiteConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
