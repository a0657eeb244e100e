//! CLI command implementations.

pub mod console;
pub mod flow;
pub mod inspect;

use std::io::Write;

use barberdesk_core::TenantDirectory;
use barberdesk_core::directory::SeedData;
use serde::Serialize;
use tracing::info;

use crate::config::CliConfig;
use crate::error::CliError;

/// Build the directory the command runs against.
///
/// Uses the configured seed file if there is one, the built-in fixture
/// otherwise.
///
/// # Errors
///
/// Returns an error if the seed file cannot be read or violates a directory
/// invariant.
pub fn load_directory(config: &CliConfig) -> Result<TenantDirectory, CliError> {
    let Some(path) = &config.seed_file else {
        info!("Using built-in fixture");
        return Ok(TenantDirectory::with_fixture());
    };

    info!(path = %path.display(), "Loading seed file");
    let yaml = std::fs::read_to_string(path).map_err(|source| CliError::SeedFile {
        path: path.clone(),
        source,
    })?;
    let seed = SeedData::from_yaml(&yaml)?;
    Ok(TenantDirectory::from_seed(seed)?)
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
