//! Barberdesk CLI library.
//!
//! The `bd-cli` binary is a thin clap front end over these modules; the
//! integration tests drive them directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commands;
pub mod config;
pub mod error;

pub use config::{CliConfig, LogFormat};
pub use error::CliError;
