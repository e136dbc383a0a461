//! Blacklist filtering for audit-plan SQL collection
//!
//! This module decides whether a collected statement or its connection
//! endpoint matches a configured blacklist rule. Supported rule kinds:
//! - `sql` / `fp_sql`: case-insensitive substring of the statement
//! - `ip`: exact address string
//! - `cidr`: subnet containment
//! - `host`: case-insensitive substring of a hostname
//! - `instance`: exact instance name
//!
//! Malformed or unknown rules never match and never fail the caller.

mod evaluator;
mod matcher;
mod rule;
mod rule_set;

pub use evaluator::BlackFilter;
pub use matcher::{KindMatcher, Pattern, Probe};
pub use rule::{FilterRule, FilterType};
pub use rule_set::{Entry, RuleSet};
