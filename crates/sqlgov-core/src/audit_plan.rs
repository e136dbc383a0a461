//! Audit-plan batch filtering
//!
//! Collected statements are checked against their project's blacklist
//! before they are queued for audit. Rules come from a [`RuleSource`]
//! supplied by the caller; each project's rules are fetched once per batch.
//! Match counters are tallied and handed back, the caller persists them.

use crate::error::Result;
use crate::filter::{BlackFilter, FilterRule};
use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;
use tracing::{debug, info};

/// Storage collaborator supplying blacklist rules
#[cfg_attr(test, mockall::automock)]
pub trait RuleSource {
    /// Current blacklist rules of a project
    fn blacklist(&self, project_id: &str) -> Result<Vec<FilterRule>>;
}

/// In-memory rule source keyed by project
#[derive(Debug, Clone, Default)]
pub struct StaticRuleSource {
    projects: HashMap<String, Vec<FilterRule>>,
}

impl StaticRuleSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rules of a project
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>, rules: Vec<FilterRule>) -> Self {
        self.projects.insert(project_id.into(), rules);
        self
    }
}

impl RuleSource for StaticRuleSource {
    fn blacklist(&self, project_id: &str) -> Result<Vec<FilterRule>> {
        Ok(self.projects.get(project_id).cloned().unwrap_or_default())
    }
}

/// A statement collected by an audit plan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditCandidate {
    /// Owning project
    pub project_id: String,
    /// Name of the instance the statement was collected from
    pub instance_name: String,
    /// Statement text
    pub sql_text: String,
    /// Fingerprint computed by the collector, if any
    pub fingerprint: Option<String>,
    /// Client endpoint representations (address, hostname, ...)
    pub endpoints: Vec<String>,
}

/// Match counters accumulated over a batch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchTally {
    /// Matches per rule id
    pub counts: BTreeMap<u64, u64>,
    /// When the batch recorded its matches
    pub last_matched: Option<SystemTime>,
}

impl MatchTally {
    /// Record one match of `rule_id`
    pub fn record(&mut self, rule_id: u64, at: SystemTime) {
        *self.counts.entry(rule_id).or_insert(0) += 1;
        self.last_matched = Some(at);
    }

    /// Total matches across all rules
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Check if nothing matched
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Result of filtering a batch
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Candidates that passed the blacklist, in input order
    pub kept: Vec<AuditCandidate>,
    /// Matches of the dropped candidates
    pub tally: MatchTally,
}

/// Filters batches of collected statements against project blacklists
pub struct BlacklistBatch<'a> {
    source: &'a dyn RuleSource,
}

impl<'a> BlacklistBatch<'a> {
    /// Create a batch filter over a rule source
    pub fn new(source: &'a dyn RuleSource) -> Self {
        Self { source }
    }

    /// Drop blacklisted candidates and tally the rules they matched.
    ///
    /// A rule source failure aborts the batch.
    pub fn filter(&self, candidates: Vec<AuditCandidate>) -> Result<BatchOutcome> {
        let mut filters: HashMap<String, Option<BlackFilter>> = HashMap::new();
        let mut outcome = BatchOutcome::default();
        let now = SystemTime::now();

        for candidate in candidates {
            if !filters.contains_key(&candidate.project_id) {
                let rules = self.source.blacklist(&candidate.project_id)?;
                debug!(project = %candidate.project_id, rules = rules.len(), "Loaded blacklist");
                let filter = (!rules.is_empty()).then(|| BlackFilter::new(&rules));
                filters.insert(candidate.project_id.clone(), filter);
            }

            let matched = filters
                .get(&candidate.project_id)
                .and_then(Option::as_ref)
                .and_then(|filter| {
                    filter.matched_audit_sql(
                        candidate.endpoints.as_slice(),
                        &candidate.sql_text,
                        candidate.fingerprint.as_deref(),
                        Some(candidate.instance_name.as_str()),
                    )
                });

            match matched {
                Some(rule_id) => outcome.tally.record(rule_id, now),
                None => outcome.kept.push(candidate),
            }
        }

        if !outcome.tally.is_empty() {
            info!(
                dropped = outcome.tally.total(),
                kept = outcome.kept.len(),
                "Filtered audit plan sqls by blacklist"
            );
        }

        Ok(outcome)
    }
}
