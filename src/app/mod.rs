//! Application glue module
//!
//! Configuration and command line handling.

mod config;

pub use config::{default_config_path, CliArgs, Config, ConfigError, SkippedConfig};
