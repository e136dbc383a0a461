//! Config command - configuration management

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use sqlgov_core::Config;
use std::path::PathBuf;
use tracing::info;

/// Application name used for the per-user config directory
const APP_NAME: &str = "sqlgov";

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Config file to show (default: detect)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "sqlgov.toml")]
        output: PathBuf,

        /// Rule file to reference from the generated config
        #[arg(short, long)]
        rules: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show { file } => show_config(file),
        ConfigAction::Generate { output, rules } => generate_config(output, rules),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Paths => show_paths(),
    }
}

fn show_config(file: Option<PathBuf>) -> Result<()> {
    let config = match file.or_else(find_config_file) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };

    let toml_str = config.to_toml().context("Failed to serialize config")?;

    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: PathBuf, rules: Option<String>) -> Result<()> {
    let mut config = Config::default();
    config.rules.file = Some(rules.unwrap_or_else(|| "rules.toml".to_string()));

    let toml_str = config.to_toml().context("Failed to serialize config")?;

    // Add header comment
    let content = format!(
        "# sqlgov configuration\n\
         # Rule kinds and whitelist modes are documented in the rule file header\n\n\
         {}",
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    info!("Generated config file: {:?}", output);
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {:?}", file))?;

    config.validate()
        .context("Configuration validation failed")?;

    println!("✓ Configuration is valid");
    println!("  Name: {}", config.general.name);
    println!("  Rule file: {}", config.rules.file.as_deref().unwrap_or("rules.toml (default)"));
    println!("  Blacklist enabled: {}", config.rules.blacklist_enabled);
    println!("  Whitelist enabled: {}", config.rules.whitelist_enabled);
    println!("  Log level: {}", config.logging.level);

    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();
    println!("  1. ./sqlgov.toml");
    println!("  2. ./config.toml");

    if let Some(dirs) = directories::ProjectDirs::from("", "", APP_NAME) {
        println!("  3. {}/config.toml", dirs.config_dir().display());
    }

    println!();
    println!("Rule file: --rules, else rules.file from the config, else ./rules.toml");

    Ok(())
}

/// First existing config file in the search path
pub fn find_config_file() -> Option<PathBuf> {
    let candidates = [PathBuf::from("sqlgov.toml"), PathBuf::from("config.toml")];

    for path in candidates {
        if path.exists() {
            return Some(path);
        }
    }

    // Check user config directory
    if let Some(dirs) = directories::ProjectDirs::from("", "", APP_NAME) {
        let path = dirs.config_dir().join("config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    None
}
