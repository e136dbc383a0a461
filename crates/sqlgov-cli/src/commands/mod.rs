//! CLI commands

pub mod check;
pub mod completions;
pub mod config;
pub mod rules;

use clap::Subcommand;
use sqlgov_core::Config;
use std::path::PathBuf;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a statement or endpoint against the rules
    Check(check::CheckArgs),

    /// Rule file management
    Rules(rules::RulesArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Rule file from the command line, else from the config, else `./rules.toml`
pub fn resolve_rules_path(explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    explicit
        .or_else(|| config.rules.file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("rules.toml"))
}
