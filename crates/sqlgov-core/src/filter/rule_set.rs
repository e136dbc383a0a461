//! Rule set construction
//!
//! Partitions persisted rules by kind and prepares their comparison keys.
//! A [`RuleSet`] is a point-in-time snapshot: build it, evaluate a batch,
//! drop it.

use super::matcher::{KindMatcher, Pattern, Probe};
use super::rule::{FilterRule, FilterType};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A prepared rule
#[derive(Debug, Clone)]
pub struct Entry {
    /// Storage identifier of the source rule
    pub id: u64,
    /// Normalized comparison key
    pub pattern: Pattern,
}

/// Rules grouped by kind, in their original order within each group
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    groups: BTreeMap<FilterType, Vec<Entry>>,
    skipped: usize,
}

impl RuleSet {
    /// Build a rule set from a snapshot of persisted rules.
    ///
    /// Rules with an unsupported kind, blank content, or malformed CIDR
    /// notation are dropped; construction itself never fails.
    pub fn new(rules: &[FilterRule]) -> Self {
        let mut set = Self::default();

        for rule in rules {
            let Some(matcher) = rule.filter_type.matcher() else {
                debug!(id = rule.id, "Skipping rule with unsupported filter type");
                set.skipped += 1;
                continue;
            };

            match (matcher.prepare)(&rule.filter_content) {
                Some(pattern) => set
                    .groups
                    .entry(rule.filter_type)
                    .or_default()
                    .push(Entry { id: rule.id, pattern }),
                None => {
                    if rule.filter_type == FilterType::Cidr && !rule.filter_content.trim().is_empty() {
                        warn!(
                            id = rule.id,
                            cidr = %rule.filter_content,
                            "Wrong cidr in black list, skipping rule"
                        );
                    } else {
                        debug!(id = rule.id, kind = %rule.filter_type, "Skipping rule with empty content");
                    }
                    set.skipped += 1;
                }
            }
        }

        set
    }

    /// Prepared entries of one kind
    pub fn entries(&self, kind: FilterType) -> &[Entry] {
        self.groups.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of prepared entries of one kind
    pub fn count(&self, kind: FilterType) -> usize {
        self.entries(kind).len()
    }

    /// Total number of prepared entries
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Check if no rule survived construction
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rules dropped during construction
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// First entry among `kinds` that matches `probe`, searched kind by kind
    pub fn find(&self, kinds: &[FilterType], probe: &Probe<'_>) -> Option<&Entry> {
        kinds.iter().find_map(|&kind| {
            let matcher: &KindMatcher = kind.matcher()?;
            self.entries(kind)
                .iter()
                .find(|entry| (matcher.matches)(&entry.pattern, probe))
        })
    }
}
