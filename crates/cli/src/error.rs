//! Unified error handling for the CLI.

use std::path::PathBuf;

use barberdesk_core::DirectoryError;
use barberdesk_core::directory::SeedError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read seed file {}: {source}", path.display())]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed: {0}")]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
