//! SQL whitelist matching
//!
//! A whitelisted statement is still audited but its result is not flagged.
//! Entries match either on the whole statement text, ignoring case, or on the
//! statement fingerprint. Fingerprints come from an external SQL
//! normalizer, injected as a [`Fingerprinter`].

use crate::error::Result;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// How a whitelist entry is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitelistMatchType {
    /// Whole statement, case-insensitive
    #[default]
    Exact,
    /// Statement fingerprint equality
    FpMatch,
}

/// One whitelist record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Storage identifier, reported back on a match
    pub id: u64,
    /// SQL statement
    pub value: String,
    /// Comparison mode
    #[serde(default)]
    pub match_type: WhitelistMatchType,
    /// Free-text annotation
    #[serde(default)]
    pub desc: String,
}

impl WhitelistEntry {
    /// Create an entry
    pub fn new(id: u64, value: impl Into<String>, match_type: WhitelistMatchType) -> Self {
        Self {
            id,
            value: value.into(),
            match_type,
            desc: String::new(),
        }
    }
}

/// SQL normalizer producing statement fingerprints
#[cfg_attr(test, mockall::automock)]
pub trait Fingerprinter {
    /// Fingerprint of a single statement
    fn fingerprint(&self, sql: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
enum Key {
    Exact(Regex),
    Fingerprint(String),
}

/// Prepared whitelist
pub struct SqlWhitelist<'a> {
    entries: Vec<(u64, Key)>,
    fingerprinter: Option<&'a dyn Fingerprinter>,
}

impl std::fmt::Debug for SqlWhitelist<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlWhitelist")
            .field("entries", &self.entries)
            .field("fingerprinter", &self.fingerprinter.is_some())
            .finish()
    }
}

impl<'a> SqlWhitelist<'a> {
    /// Prepare whitelist entries.
    ///
    /// `fp_match` entries need a fingerprinter; without one, or when the
    /// fingerprinter rejects the entry's SQL, the entry is skipped.
    pub fn new(entries: &[WhitelistEntry], fingerprinter: Option<&'a dyn Fingerprinter>) -> Self {
        let mut prepared = Vec::with_capacity(entries.len());

        for entry in entries {
            let key = match entry.match_type {
                WhitelistMatchType::Exact => match exact_key(&entry.value) {
                    Some(re) => Key::Exact(re),
                    None => {
                        warn!(id = entry.id, "Cannot compile whitelist sql, skipping entry");
                        continue;
                    }
                },
                WhitelistMatchType::FpMatch => {
                    let Some(fp) = fingerprinter else {
                        warn!(id = entry.id, "No fingerprinter available, skipping fp_match whitelist entry");
                        continue;
                    };
                    match fp.fingerprint(&entry.value) {
                        Ok(fingerprint) => Key::Fingerprint(fingerprint),
                        Err(e) => {
                            error!(
                                id = entry.id,
                                "Parse whitelist sql error: {}, please check the accuracy of whitelist SQL: {}",
                                e,
                                entry.value
                            );
                            continue;
                        }
                    }
                }
            };
            prepared.push((entry.id, key));
        }

        Self {
            entries: prepared,
            fingerprinter,
        }
    }

    /// Number of usable entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entry is usable
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if `sql` is whitelisted
    pub fn is_whitelisted(&self, sql: &str) -> bool {
        self.matched(sql).is_some()
    }

    /// Id of the first entry matching `sql`
    pub fn matched(&self, sql: &str) -> Option<u64> {
        let trimmed = sql.trim();
        let mut fingerprint: Option<Option<String>> = None;

        for (id, key) in &self.entries {
            let hit = match key {
                Key::Exact(re) => re.is_match(trimmed),
                Key::Fingerprint(value) => {
                    let candidate = fingerprint.get_or_insert_with(|| self.candidate_fingerprint(sql));
                    candidate.as_deref() == Some(value.as_str())
                }
            };
            if hit {
                debug!(id, "Matched sql whitelist entry");
                return Some(*id);
            }
        }

        None
    }

    fn candidate_fingerprint(&self, sql: &str) -> Option<String> {
        let fp = self.fingerprinter?;
        match fp.fingerprint(sql.trim()) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                debug!("Cannot fingerprint candidate statement: {}", e);
                None
            }
        }
    }
}

/// Whole-statement, case-insensitive key with simple case folding
fn exact_key(value: &str) -> Option<Regex> {
    RegexBuilder::new(&format!("^{}$", regex::escape(value.trim())))
        .case_insensitive(true)
        .build()
        .ok()
}
