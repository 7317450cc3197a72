//! qf CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod input;

use commands::{Cli, Commands};
use config::{ConfigError, QfConfig};
use input::InputError;
use qf_core::FormatError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Commands::Render(args) => {
            let config = QfConfig::load(cli.config.as_deref(), &current_dir)?;
            commands::render::execute(args, config)
        }
        Commands::Escape(args) => commands::escape::execute(args),
    }
}

/// Logs go to stderr so stdout carries only rendered output.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "qf=debug" } else { "qf=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", default_level)));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.is::<InputError>() || cause.is::<ConfigError>() {
            return ExitCodes::INVALID_ARGS;
        }
        if cause.is::<FormatError>() {
            return ExitCodes::TEMPLATE_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_categorize_error() {
        let template: anyhow::Result<()> = Err(FormatError::RecursionLimit { limit: 10 }.into());
        let template = template.context("Failed to render template").unwrap_err();
        assert_eq!(categorize_error(&template), ExitCodes::TEMPLATE_ERROR);

        let config = anyhow::Error::from(ConfigError::NotFound(PathBuf::from("qf.toml")));
        assert_eq!(categorize_error(&config), ExitCodes::INVALID_ARGS);

        let other = anyhow::anyhow!("boom");
        assert_eq!(categorize_error(&other), ExitCodes::GENERAL_ERROR);
    }
}
