//! vulnscout command-line interface.

mod backend;
mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use vulnscout_core::VulnscoutConfig;
use vulnscout_server::{LogTarget, init_tracing};

use crate::cli::{Cli, Commands};
use crate::error::CliError;

/// Log level for one-shot commands unless `--log-level` is given.
const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                CliError::Findings { .. } => eprintln!("{}", e.to_string().red().bold()),
                _ => eprintln!("{} {e}", "error:".red().bold()),
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = VulnscoutConfig::load_or_default(&cli.config).await?;

    let is_server = matches!(cli.command, Commands::Server(_));
    let mut general = config.general.clone();
    match (&cli.log_level, is_server) {
        (Some(level), _) => general.log_level.clone_from(level),
        (None, true) => {}
        (None, false) => general.log_level = DEFAULT_CLI_LOG_LEVEL.to_owned(),
    }
    let target = if is_server {
        LogTarget::Stdout
    } else {
        LogTarget::Stderr
    };
    init_tracing(&general, target).map_err(|e| CliError::Config(e.to_string()))?;

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &config).await,
        Commands::File(args) => commands::file::execute(args, &config).await,
        Commands::Server(args) => commands::server::execute(args, config).await,
        Commands::Health(args) => commands::health::execute(args).await,
    }
}
