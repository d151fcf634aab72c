//! Configuration for the editor
//!
//! Settings come from, in increasing priority:
//! - built-in defaults
//! - `$HOME/.config/tilde/config.json` (or the file given with `--config`)
//! - command line arguments

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Command line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tilde")]
#[command(version)]
#[command(about = "A small terminal text editor", long_about = None)]
pub struct CliArgs {
    /// File to open
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Line to put the cursor on (1-based)
    #[arg(
        short,
        long,
        value_name = "N",
        requires = "file",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub line: Option<usize>,

    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raw-mode read timeout in tenths of a second
    pub read_timeout_deciseconds: u8,
    /// Letter that quits together with Ctrl
    pub exit_key: char,
    /// Marker drawn at the start of each row
    pub filler: char,
    /// Log destination; logging is off when unset
    pub log_file: Option<PathBuf>,
    /// `tracing` filter directive, `RUST_LOG` wins when set
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_timeout_deciseconds: 1,
            exit_key: 'q',
            filler: '~',
            log_file: None,
            log_filter: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => warn!("Ignoring config {}: {}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Load configuration with CLI args > config file > defaults
    ///
    /// A file named with `--config` must load. A broken file at the default
    /// location is skipped and handed back so the caller can report it once
    /// logging is up.
    pub fn load_with_args(args: &CliArgs) -> Result<(Self, Option<SkippedConfig>), ConfigError> {
        Self::load_with_args_from(args, default_config_path())
    }

    fn load_with_args_from(
        args: &CliArgs,
        default_path: Option<PathBuf>,
    ) -> Result<(Self, Option<SkippedConfig>), ConfigError> {
        let mut skipped = None;
        let mut config = match (&args.config, default_path) {
            (Some(path), _) => Self::load(path)?,
            (None, Some(path)) if path.exists() => match Self::load(&path) {
                Ok(config) => config,
                Err(error) => {
                    skipped = Some(SkippedConfig { path, error });
                    Self::default()
                }
            },
            (None, _) => Self::default(),
        };

        if let Some(log_file) = &args.log_file {
            config.log_file = Some(log_file.clone());
        }

        config.validate()?;
        Ok((config, skipped))
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_deciseconds == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_deciseconds",
                message: "must be at least 1".to_string(),
            });
        }
        if !self.exit_key.is_ascii_alphabetic() {
            return Err(ConfigError::Invalid {
                field: "exit_key",
                message: format!("{:?} is not an ASCII letter", self.exit_key),
            });
        }
        if !self.filler.is_ascii_graphic() {
            return Err(ConfigError::Invalid {
                field: "filler",
                message: format!("{:?} is not a printable ASCII character", self.filler),
            });
        }
        Ok(())
    }
}

/// `$HOME/.config/tilde/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("tilde")
            .join("config.json")
    })
}

/// A config file that exists but could not be used
#[derive(Debug, thiserror::Error)]
#[error("Ignoring config {}: {error}", .path.display())]
pub struct SkippedConfig {
    pub path: PathBuf,
    #[source]
    pub error: ConfigError,
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error in '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.read_timeout_deciseconds, 1);
        assert_eq!(config.exit_key, 'q');
        assert_eq!(config.filler, '~');
        assert!(config.log_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "filler": "." }"#).unwrap();
        assert_eq!(config.filler, '.');
        assert_eq!(config.exit_key, 'q');
        assert_eq!(config.read_timeout_deciseconds, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            exit_key: 'x',
            log_filter: Some("tilde=debug".to_string()),
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_timeout = Config {
            read_timeout_deciseconds: 0,
            ..Config::default()
        };
        assert!(matches!(
            zero_timeout.validate(),
            Err(ConfigError::Invalid { field: "read_timeout_deciseconds", .. })
        ));

        let digit_exit = Config {
            exit_key: '1',
            ..Config::default()
        };
        assert!(digit_exit.validate().is_err());

        let blank_filler = Config {
            filler: ' ',
            ..Config::default()
        };
        assert!(blank_filler.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "log_file": "/tmp/from-file.log", "exit_key": "w" }"#).unwrap();

        let args = CliArgs {
            config: Some(path),
            log_file: Some(PathBuf::from("/tmp/from-cli.log")),
            ..CliArgs::default()
        };
        let (config, skipped) = Config::load_with_args(&args).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/from-cli.log")));
        assert_eq!(config.exit_key, 'w');
        assert!(skipped.is_none());
    }

    #[test]
    fn test_broken_default_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ \"filler\": ").unwrap();

        let (config, skipped) =
            Config::load_with_args_from(&CliArgs::default(), Some(path.clone())).unwrap();
        assert_eq!(config, Config::default());

        let skipped = skipped.unwrap();
        assert_eq!(skipped.path, path);
        assert!(matches!(skipped.error, ConfigError::Json(_)));
        assert!(skipped.to_string().starts_with("Ignoring config"));
    }

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, skipped) = Config::load_with_args_from(
            &CliArgs::default(),
            Some(dir.path().join("config.json")),
        )
        .unwrap();
        assert_eq!(config, Config::default());
        assert!(skipped.is_none());
    }

    #[test]
    fn test_valid_default_config_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "filler": "." }"#).unwrap();

        let (config, skipped) =
            Config::load_with_args_from(&CliArgs::default(), Some(path)).unwrap();
        assert_eq!(config.filler, '.');
        assert!(skipped.is_none());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            config: Some(dir.path().join("missing.json")),
            ..CliArgs::default()
        };
        assert!(matches!(
            Config::load_with_args(&args),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_cli_args_parse() {
        let args = CliArgs::try_parse_from(["tilde", "notes.txt", "--line", "12"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(args.line, Some(12));

        assert!(CliArgs::try_parse_from(["tilde", "notes.txt", "--line", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["tilde", "--line", "3"]).is_err());
    }
}
