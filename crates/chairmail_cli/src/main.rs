//! Chair mail recipient CLI.
//!
//! # Responsibility
//! - Load recipient payloads from files and run one selection command.
//! - Keep output deterministic for scripting and quick local checks.

use chairmail_core::{init_from_config, ComposeConfig};
use clap::Parser;

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{run_members, run_recipients, run_search, run_version};

fn main() {
    let cli = Cli::parse();
    let config = match config_from_cli(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(2);
        }
    };
    if let Err(error) = init_from_config(&config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Search(args) => run_search(&cli, config, args),
        Command::Recipients(args) => run_recipients(&cli, config, args),
        Command::Members(args) => run_members(&cli, config, args),
        Command::Version => {
            run_version();
            Ok(())
        }
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// Environment config with command-line flags taking precedence.
fn config_from_cli(cli: &Cli) -> Result<ComposeConfig, chairmail_core::ConfigError> {
    let mut config = ComposeConfig::from_env()?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}
