//! Rule file management commands
//!
//! Commands for listing, validating and creating blacklist/whitelist rule files.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sqlgov_core::filter::{FilterRule, FilterType};
use sqlgov_core::{Config, RuleFile};
use std::path::PathBuf;
use tracing::{info, warn};

use super::resolve_rules_path;

/// Rule management arguments
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommands,
}

/// Rule subcommands
#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List all rules grouped by kind
    List {
        /// Rule file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Validate every rule in a rule file
    Validate {
        /// Rule file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Create a new rule file with example entries
    Init {
        /// Rule file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute rules command
pub fn execute(args: RulesArgs, config: &Config) -> Result<()> {
    match args.command {
        RulesCommands::List { file } => list_rules(resolve_rules_path(file, config)),
        RulesCommands::Validate { file } => validate_rules(resolve_rules_path(file, config)),
        RulesCommands::Init { file, force } => init_rules(resolve_rules_path(file, config), force),
    }
}

fn list_rules(path: PathBuf) -> Result<()> {
    if !path.exists() {
        println!("{}", "Rule file not found. Create one with 'rules init'".yellow());
        println!("Expected path: {}", path.display());
        return Ok(());
    }

    let file = RuleFile::load(&path).context("Failed to load rule file")?;

    println!("{}", "═".repeat(50).bright_blue());
    println!("{}", " Blacklist".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("File: {}", path.display().to_string().cyan());
    println!("Total rules: {}", file.blacklist.len().to_string().green());

    for kind in FilterType::ALL {
        let rules: Vec<&FilterRule> = file
            .blacklist
            .iter()
            .filter(|r| r.filter_type == kind)
            .collect();
        if rules.is_empty() {
            continue;
        }
        println!("{}", "─".repeat(50).bright_black());
        println!("{} ({})", kind.as_str().bright_white(), rules.len());
        for rule in rules {
            print_rule(rule);
        }
    }

    let unsupported: Vec<&FilterRule> = file
        .blacklist
        .iter()
        .filter(|r| !r.filter_type.is_supported())
        .collect();
    if !unsupported.is_empty() {
        println!("{}", "─".repeat(50).bright_black());
        println!("{} ({})", "unsupported".yellow(), unsupported.len());
        for rule in unsupported {
            print_rule(rule);
        }
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("{}", " Whitelist".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());

    if file.whitelist.is_empty() {
        println!("{}", "  (empty)".dimmed());
    } else {
        for entry in &file.whitelist {
            println!(
                "  {} #{} [{:?}] {}",
                "●".green(),
                entry.id,
                entry.match_type,
                entry.value.cyan()
            );
        }
    }

    println!("{}", "═".repeat(50).bright_blue());

    Ok(())
}

fn print_rule(rule: &FilterRule) {
    let marker = if rule.validate().is_ok() { "●".green() } else { "✗".red() };
    if rule.desc.is_empty() {
        println!("  {} #{} {}", marker, rule.id, rule.filter_content);
    } else {
        println!(
            "  {} #{} {} {}",
            marker,
            rule.id,
            rule.filter_content,
            format!("- {}", rule.desc).dimmed()
        );
    }
}

fn validate_rules(path: PathBuf) -> Result<()> {
    let file = RuleFile::load(&path)
        .with_context(|| format!("Failed to load rule file {}", path.display()))?;

    let problems = file.invalid_rules();
    if problems.is_empty() {
        println!("{} Rule file is valid", "✓".green());
        println!("  Blacklist rules: {}", file.blacklist.len());
        println!("  Whitelist entries: {}", file.whitelist.len());
        return Ok(());
    }

    for problem in &problems {
        warn!("{}", problem);
        println!("  {} {}", "✗".red(), problem);
    }
    bail!("{} invalid rule(s) in {}", problems.len(), path.display())
}

fn init_rules(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Rule file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    RuleFile::example()
        .save(&path)
        .with_context(|| format!("Failed to write rule file {}", path.display()))?;

    info!(path = %path.display(), "Created rule file");
    println!("{} Created rule file: {}", "✓".green(), path.display());

    Ok(())
}
