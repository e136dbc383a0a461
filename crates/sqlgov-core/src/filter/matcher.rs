//! Per-kind matchers
//!
//! Each [`FilterType`] owns a [`KindMatcher`]: a `prepare` function that turns
//! rule content into a comparison key once, when the rule set is built, and a
//! `matches` function that tests a prepared key against a candidate.
//! [`FilterType::matcher`] is the lookup table.

use super::rule::FilterType;
use ipnet::IpNet;
use once_cell::unsync::OnceCell;
use regex::{Regex, RegexBuilder};
use std::net::IpAddr;

/// Rule content after per-kind normalization
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Trimmed text key compared by equality (IP, instance)
    Text(String),
    /// Escaped content compiled for case-insensitive search (SQL, host)
    Literal(Regex),
    /// Parsed network for CIDR rules
    Net(IpNet),
}

/// A candidate value with the derived forms the matchers compare against.
///
/// The address form is parsed on first use, so SQL-only checks never pay
/// for it.
#[derive(Debug, Clone)]
pub struct Probe<'a> {
    raw: &'a str,
    trimmed: &'a str,
    addr: OnceCell<Option<IpAddr>>,
}

impl<'a> Probe<'a> {
    /// Wrap a candidate
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            trimmed: raw.trim(),
            addr: OnceCell::new(),
        }
    }

    /// The candidate as supplied
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The candidate parsed as an IP address, if it is one
    pub fn addr(&self) -> Option<IpAddr> {
        *self.addr.get_or_init(|| self.trimmed.parse().ok())
    }
}

/// Prepare and match functions for one filter kind
#[derive(Debug, Clone, Copy)]
pub struct KindMatcher {
    /// Normalize rule content; `None` drops the rule
    pub prepare: fn(&str) -> Option<Pattern>,
    /// Test a prepared pattern against a candidate
    pub matches: fn(&Pattern, &Probe<'_>) -> bool,
}

const SQL: KindMatcher = KindMatcher {
    prepare: prepare_literal,
    matches: contains_literal,
};

const IP: KindMatcher = KindMatcher {
    prepare: prepare_trimmed,
    matches: equals_trimmed,
};

const CIDR: KindMatcher = KindMatcher {
    prepare: prepare_cidr,
    matches: contains_addr,
};

const HOST: KindMatcher = KindMatcher {
    prepare: prepare_literal,
    matches: contains_literal,
};

const INSTANCE: KindMatcher = KindMatcher {
    prepare: prepare_trimmed,
    matches: equals_trimmed,
};

impl FilterType {
    /// Matcher for this kind, `None` for kinds the engine does not evaluate
    pub fn matcher(self) -> Option<&'static KindMatcher> {
        match self {
            // fp_sql content is treated exactly like raw SQL text
            FilterType::Sql | FilterType::FpSql => Some(&SQL),
            FilterType::Ip => Some(&IP),
            FilterType::Cidr => Some(&CIDR),
            FilterType::Host => Some(&HOST),
            FilterType::Instance => Some(&INSTANCE),
            FilterType::Unsupported => None,
        }
    }
}

// Simple case folding only: one char never folds to several, so `ß` and
// `SS` stay distinct.
fn prepare_literal(content: &str) -> Option<Pattern> {
    if content.trim().is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(content))
        .case_insensitive(true)
        .build()
        .ok()
        .map(Pattern::Literal)
}

fn prepare_trimmed(content: &str) -> Option<Pattern> {
    let content = content.trim();
    (!content.is_empty()).then(|| Pattern::Text(content.to_string()))
}

fn prepare_cidr(content: &str) -> Option<Pattern> {
    content.trim().parse::<IpNet>().ok().map(Pattern::Net)
}

fn contains_literal(pattern: &Pattern, probe: &Probe<'_>) -> bool {
    match pattern {
        Pattern::Literal(re) => re.is_match(probe.raw),
        _ => false,
    }
}

fn equals_trimmed(pattern: &Pattern, probe: &Probe<'_>) -> bool {
    match pattern {
        Pattern::Text(key) => probe.trimmed == key,
        _ => false,
    }
}

fn contains_addr(pattern: &Pattern, probe: &Probe<'_>) -> bool {
    match (pattern, probe.addr()) {
        (Pattern::Net(net), Some(addr)) => net.contains(&addr),
        _ => false,
    }
}
