//! Check command - evaluate a candidate against a rule file

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use sqlgov_core::filter::{BlackFilter, FilterRule};
use sqlgov_core::{Config, RuleFile, SqlWhitelist};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::resolve_rules_path;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Rule file path (default: from config, else ./rules.toml)
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// SQL text to check
    #[arg(short, long)]
    pub sql: Option<String>,

    /// Precomputed SQL fingerprint to check against fp_sql rules
    #[arg(short, long)]
    pub fingerprint: Option<String>,

    /// Instance name to check against instance rules
    #[arg(short, long)]
    pub instance: Option<String>,

    /// Endpoint representation (IP or hostname), repeatable
    #[arg(short, long)]
    pub endpoint: Vec<String>,

    /// Also check the SQL text against the whitelist
    #[arg(short, long)]
    pub whitelist: bool,
}

/// Execute check command
pub fn execute(args: CheckArgs, config: &Config) -> Result<()> {
    if args.sql.is_none() && args.fingerprint.is_none() && args.instance.is_none() && args.endpoint.is_empty() {
        bail!("Nothing to check: pass --sql, --fingerprint, --instance or --endpoint");
    }

    let path = resolve_rules_path(args.rules.clone(), config);
    let file = RuleFile::load(&path)
        .with_context(|| format!("Failed to load rules from {}", path.display()))?;
    for problem in file.invalid_rules() {
        warn!("{}", problem);
    }

    println!("{}", "─".repeat(50).bright_black());
    println!("Rules: {}", path.display().to_string().cyan());

    if config.rules.blacklist_enabled {
        report_blacklist(&args, &file);
    } else {
        info!("Blacklist disabled by configuration");
        println!("Blacklist: {}", "disabled".dimmed());
    }

    if args.whitelist {
        if !config.rules.whitelist_enabled {
            println!("Whitelist: {}", "disabled".dimmed());
        } else if let Some(sql) = args.sql.as_deref() {
            let whitelist = SqlWhitelist::new(&file.whitelist, None);
            match whitelist.matched(sql) {
                Some(id) => println!("Whitelist: {} (entry {})", "matched".green(), id),
                None => println!("Whitelist: {}", "no match".yellow()),
            }
        } else {
            println!("Whitelist: {}", "needs --sql".dimmed());
        }
    }

    println!("{}", "─".repeat(50).bright_black());

    Ok(())
}

fn report_blacklist(args: &CheckArgs, file: &RuleFile) {
    let filter = BlackFilter::new(&file.blacklist);
    debug!(
        rules = filter.rule_set().len(),
        skipped = filter.rule_set().skipped(),
        "Built blacklist rule set"
    );

    if !args.endpoint.is_empty() {
        print_line("Endpoint", filter.matched_endpoint(args.endpoint.as_slice()), &file.blacklist);
    }
    if let Some(sql) = args.sql.as_deref() {
        print_line("SQL", filter.matched_sql(sql), &file.blacklist);
    }
    if let Some(fp) = args.fingerprint.as_deref() {
        print_line("Fingerprint", filter.matched_fingerprint(fp), &file.blacklist);
    }
    if let Some(instance) = args.instance.as_deref() {
        print_line("Instance", filter.matched_instance(instance), &file.blacklist);
    }

    let overall = filter.matched_audit_sql(
        args.endpoint.as_slice(),
        args.sql.as_deref().unwrap_or_default(),
        args.fingerprint.as_deref(),
        args.instance.as_deref(),
    );
    println!(
        "Result: {}",
        match overall {
            Some(_) => "Blacklisted (excluded from audit plan)".red(),
            None => "Not blacklisted".green(),
        }
    );
}

fn print_line(label: &str, matched: Option<u64>, rules: &[FilterRule]) {
    match matched.and_then(|id| rules.iter().find(|r| r.id == id)) {
        Some(rule) => {
            let desc = if rule.desc.is_empty() {
                String::new()
            } else {
                format!(" - {}", rule.desc)
            };
            println!(
                "{label}: {} rule {} [{}] {}{}",
                "matched".red(),
                rule.id,
                rule.filter_type,
                rule.filter_content.cyan(),
                desc.dimmed()
            );
        }
        None => println!("{label}: {}", "no match".green()),
    }
}
