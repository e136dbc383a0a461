//! sqlgov CLI
//!
//! Command-line interface for the SQL governance filter engine.

mod args;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use sqlgov_core::Config;
use std::path::PathBuf;
use tracing::{debug, error};

use args::Args;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_config(&args)?;

    // Initialize logging
    logging::init(&args, &config.logging)?;
    debug!(name = %config.general.name, "Configuration loaded");

    // Run the main logic
    let result = run(args, &config);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn load_config(args: &Args) -> Result<Config> {
    let path = match args.config.as_deref() {
        Some(path) => PathBuf::from(path),
        None => match commands::config::find_config_file() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Configuration validation failed for {}", path.display()))?;
    Ok(config)
}

fn run(args: Args, config: &Config) -> Result<()> {
    match args.command {
        commands::Command::Check(check_args) => {
            commands::check::execute(check_args, config)
        }
        commands::Command::Rules(rules_args) => {
            commands::rules::execute(rules_args, config)
        }
        commands::Command::Config(config_args) => {
            commands::config::execute(config_args)
        }
        commands::Command::Completions(comp_args) => {
            commands::completions::execute(comp_args)
        }
    }
}
