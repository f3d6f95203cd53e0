//! Configuration module for Update Runner.
//!
//! This module handles parsing, validation, and access to configuration
//! settings. Configuration is loaded from a JSON (or YAML) file; every
//! setting is optional and falls back to the defaults of a Go server checked
//! out next to the runner.
//!
//! # Examples
//!
//! Loading a configuration from a file:
//!
//! ```no_run
//! use update_runner::config::{Config, validate_config};
//!
//! let config = Config::from_file("updater.json").unwrap();
//! validate_config(&config).unwrap();
//! println!("Polling {} every {}s", config.remote_version_url, config.poll_interval_secs);
//! ```
//!
//! Creating a configuration programmatically:
//!
//! ```
//! use update_runner::config::{CommandConfig, Config};
//!
//! let config = Config {
//!     remote_version_url: "https://example.com/version.txt".to_string(),
//!     server: CommandConfig::new("./my-server", &["--port", "8080"]),
//!     ..Config::default()
//! };
//! assert_eq!(config.server.display(), "./my-server --port 8080");
//! ```
mod parser;
pub mod validator;

pub use parser::{CommandConfig, Config, PipelineConfig};
pub use validator::validate_config;
