//! Filter rule records
//!
//! A [`FilterRule`] is one persisted blacklist entry. The engine only reads
//! `filter_type` and `filter_content`; the counters are carried through for
//! the owning storage layer.

use crate::error::{Error, Result};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::SystemTime;

/// Kind of a blacklist rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Raw SQL text, matched as a case-insensitive substring
    Sql,
    /// SQL fingerprint, matched with the same substring policy as `Sql`
    FpSql,
    /// Literal IP address, matched by exact string equality
    Ip,
    /// CIDR block, matched by subnet containment
    Cidr,
    /// Hostname fragment, matched as a case-insensitive substring
    Host,
    /// Instance name, matched by exact equality
    Instance,
    /// Any tag this build does not know; never matches
    #[serde(other)]
    Unsupported,
}

impl FilterType {
    /// Every kind the engine evaluates
    pub const ALL: [FilterType; 6] = [
        FilterType::Sql,
        FilterType::FpSql,
        FilterType::Ip,
        FilterType::Cidr,
        FilterType::Host,
        FilterType::Instance,
    ];

    /// Kinds consulted when matching SQL text
    pub const SQL_KINDS: [FilterType; 2] = [FilterType::Sql, FilterType::FpSql];

    /// Kinds consulted when matching endpoint identifiers
    pub const ENDPOINT_KINDS: [FilterType; 3] =
        [FilterType::Ip, FilterType::Cidr, FilterType::Host];

    /// Wire name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Sql => "sql",
            FilterType::FpSql => "fp_sql",
            FilterType::Ip => "ip",
            FilterType::Cidr => "cidr",
            FilterType::Host => "host",
            FilterType::Instance => "instance",
            FilterType::Unsupported => "unsupported",
        }
    }

    /// Whether the engine knows how to evaluate this kind
    pub fn is_supported(self) -> bool {
        self != FilterType::Unsupported
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sql" => Ok(FilterType::Sql),
            "fp_sql" => Ok(FilterType::FpSql),
            "ip" => Ok(FilterType::Ip),
            "cidr" => Ok(FilterType::Cidr),
            "host" => Ok(FilterType::Host),
            "instance" => Ok(FilterType::Instance),
            other => Err(Error::config_value(
                "type",
                format!("unknown filter type '{other}', expected one of sql, fp_sql, ip, cidr, host, instance"),
            )),
        }
    }
}

/// One blacklist entry as supplied by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Storage identifier, reported back on a match
    pub id: u64,
    /// Declared kind
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Pattern text
    #[serde(rename = "content")]
    pub filter_content: String,
    /// Free-text annotation, not evaluated
    #[serde(default)]
    pub desc: String,
    /// Number of times the rule has matched (maintained by the caller)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub matched_count: u64,
    /// Time of the last match (maintained by the caller)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_match_time: Option<SystemTime>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl FilterRule {
    /// Create a rule with no annotation and zeroed counters
    pub fn new(id: u64, filter_type: FilterType, content: impl Into<String>) -> Self {
        Self {
            id,
            filter_type,
            filter_content: content.into(),
            desc: String::new(),
            matched_count: 0,
            last_match_time: None,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Check the rule the way the admin API does before saving it.
    ///
    /// The evaluator never calls this; it silently skips bad rules instead.
    pub fn validate(&self) -> Result<()> {
        let content = self.filter_content.trim();

        if !self.filter_type.is_supported() {
            return Err(Error::invalid_rule(self.id, "unsupported filter type"));
        }
        if content.is_empty() {
            return Err(Error::invalid_rule(self.id, "content is required"));
        }

        match self.filter_type {
            FilterType::Ip => {
                content.parse::<IpAddr>().map_err(|e| {
                    Error::invalid_rule(self.id, format!("'{content}' is not an IP address: {e}"))
                })?;
            }
            FilterType::Cidr => {
                content.parse::<IpNet>().map_err(|e| {
                    Error::invalid_rule(self.id, format!("'{content}' is not a CIDR block: {e}"))
                })?;
            }
            _ => {}
        }

        Ok(())
    }
}
