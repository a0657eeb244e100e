//! Barberdesk CLI - exercise the tenant directory from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Run the scripted owner/staff flow against the built-in fixture
//! bd-cli flow
//!
//! # Same flow against a custom seed, keeping the created staff member
//! bd-cli --seed seeds/demo.yaml flow --keep-staff
//!
//! # Interactive console
//! bd-cli console
//!
//! # Inspect the directory
//! bd-cli dump --json
//! bd-cli stats --owner owner@barbershop.com
//! ```
//!
//! # Commands
//!
//! - `flow` - Scripted end-to-end check; exits non-zero if any step fails
//! - `console` - Interactive login/staff management session
//! - `dump` - Print every salon, account and staff member
//! - `stats` - Staff statistics for one owner's salon

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use barberdesk_cli::commands::{self, console, flow, inspect};
use barberdesk_cli::config::DEFAULT_LOG_FILTER;
use barberdesk_cli::{CliConfig, CliError, LogFormat};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bd-cli")]
#[command(author, version, about = "Barberdesk CLI tools")]
struct Cli {
    /// YAML seed file (overrides `BARBERDESK_SEED_FILE`)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Log format (overrides `BARBERDESK_LOG_FORMAT`)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted owner/staff flow
    Flow {
        /// Owner email to log in with
        #[arg(long, default_value = "owner@barbershop.com")]
        owner: String,

        /// Owner password
        #[arg(long, default_value = "password123")]
        password: String,

        /// Keep the staff member the flow creates
        #[arg(long)]
        keep_staff: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive console
    Console,
    /// Print the whole directory
    Dump {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show staff statistics for an owner's salon
    Stats {
        /// Owner email
        #[arg(short, long)]
        owner: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config.with_overrides(cli.seed.clone(), cli.log_format),
        Err(e) => {
            init_tracing(cli.log_format.unwrap_or_default());
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_writer(io::stderr)).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
    }
}

fn run(command: Commands, config: &CliConfig) -> Result<ExitCode, CliError> {
    let mut dir = commands::load_directory(config)?;
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Flow {
            owner,
            password,
            keep_staff,
            json,
        } => {
            let options = flow::FlowOptions {
                owner_email: owner,
                owner_password: password,
                cleanup: !keep_staff,
                ..flow::FlowOptions::default()
            };
            let report = flow::run(&mut dir, &options);
            if json {
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            } else {
                writeln!(stdout, "{report}")?;
            }
            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Console => console::run(&mut dir, io::stdin().lock(), stdout)?,
        Commands::Dump { json } => inspect::dump(&dir, json, &mut stdout)?,
        Commands::Stats { owner, json } => inspect::stats(&dir, &owner, json, &mut stdout)?,
    }
    Ok(ExitCode::SUCCESS)
}
