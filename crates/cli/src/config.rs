//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BARBERDESK_SEED_FILE` - YAML seed to load instead of the built-in fixture
//! - `BARBERDESK_LOG_FORMAT` - `pretty` (default) or `json`
//! - `RUST_LOG` - tracing filter (default: `barberdesk_cli=info,barberdesk_core=info`)
//!
//! Command-line flags take precedence over the environment.

use std::path::PathBuf;

use clap::ValueEnum;
use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str = "barberdesk_cli=info,barberdesk_core=info";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got {other:?}")),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// YAML seed file; `None` uses the built-in fixture.
    pub seed_file: Option<PathBuf>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let seed_file = get("BARBERDESK_SEED_FILE").map(PathBuf::from);
        let log_format = get("BARBERDESK_LOG_FORMAT")
            .map(|value| {
                value.parse::<LogFormat>().map_err(|e| {
                    ConfigError::InvalidEnvVar("BARBERDESK_LOG_FORMAT".to_string(), e)
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            seed_file,
            log_format,
        })
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, seed_file: Option<PathBuf>, log_format: Option<LogFormat>) -> Self {
        if seed_file.is_some() {
            self.seed_file = seed_file;
        }
        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }
        self
    }
}
