//! File-backed rules
//!
//! A rule file is a TOML document holding blacklist and whitelist tables:
//!
//! ```toml
//! [[blacklist]]
//! id = 1
//! type = "cidr"
//! content = "10.100.0.0/16"
//! desc = "batch hosts"
//!
//! [[whitelist]]
//! id = 1
//! value = "select 1"
//! match_type = "exact"
//! ```
//!
//! Used by the CLI and tests; it serves the same blacklist to every project.

use crate::audit_plan::RuleSource;
use crate::error::{Error, Result};
use crate::filter::{FilterRule, FilterType};
use crate::whitelist::{WhitelistEntry, WhitelistMatchType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Parsed rule file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFile {
    /// Blacklist rules
    pub blacklist: Vec<FilterRule>,
    /// SQL whitelist entries
    pub whitelist: Vec<WhitelistEntry>,
}

impl RuleFile {
    /// Load a rule file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::rule_file(path.display().to_string(), e.to_string()))?;
        let file = toml::from_str::<Self>(&content)
            .map_err(|e| Error::rule_file(path.display().to_string(), e.to_string()))?;

        info!(
            "Loaded {} blacklist and {} whitelist rules from {}",
            file.blacklist.len(),
            file.whitelist.len(),
            path.display()
        );
        Ok(file)
    }

    /// Parse a rule file from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::rule_file("<memory>", e.to_string()))
    }

    /// Write the rule file to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut content = String::new();
        content.push_str("# sqlgov rule file\n");
        content.push_str("#\n");
        content.push_str("# blacklist types: sql, fp_sql, ip, cidr, host, instance\n");
        content.push_str("# whitelist match_type: exact, fp_match\n\n");
        content.push_str(&self.to_toml()?);

        std::fs::write(path, content)?;
        info!("Saved {} rules to {}", self.len(), path.display());
        Ok(())
    }

    /// Validate every blacklist rule, returning the failures.
    ///
    /// Ids must be unique within each table, since matches are reported
    /// and counted by id.
    pub fn invalid_rules(&self) -> Vec<Error> {
        let mut errors: Vec<Error> = self
            .blacklist
            .iter()
            .filter_map(|rule| rule.validate().err())
            .collect();

        let mut seen = HashSet::new();
        for rule in &self.blacklist {
            if !seen.insert(rule.id) {
                errors.push(Error::invalid_rule(rule.id, "duplicate blacklist id"));
            }
        }

        seen.clear();
        for entry in &self.whitelist {
            if !seen.insert(entry.id) {
                errors.push(Error::invalid_rule(entry.id, "duplicate whitelist id"));
            }
        }

        errors
    }

    /// Total number of rules in the file
    pub fn len(&self) -> usize {
        self.blacklist.len() + self.whitelist.len()
    }

    /// Check if the file has no rules
    pub fn is_empty(&self) -> bool {
        self.blacklist.is_empty() && self.whitelist.is_empty()
    }

    /// Starter file with one rule of each kind
    pub fn example() -> Self {
        Self {
            blacklist: vec![
                FilterRule::new(1, FilterType::Sql, "select sleep(").with_desc("Ignore probe queries"),
                FilterRule::new(2, FilterType::FpSql, "select * from t_heartbeat where id = ?")
                    .with_desc("Heartbeat fingerprint"),
                FilterRule::new(3, FilterType::Ip, "10.0.5.67").with_desc("Backup agent"),
                FilterRule::new(4, FilterType::Cidr, "10.100.0.0/16").with_desc("Batch subnet"),
                FilterRule::new(5, FilterType::Host, "monitor").with_desc("Monitoring hosts"),
                FilterRule::new(6, FilterType::Instance, "mysql-sandbox").with_desc("Sandbox instance"),
            ],
            whitelist: vec![WhitelistEntry::new(1, "SELECT 1", WhitelistMatchType::Exact)],
        }
    }
}

impl RuleSource for RuleFile {
    fn blacklist(&self, _project_id: &str) -> Result<Vec<FilterRule>> {
        Ok(self.blacklist.clone())
    }
}
