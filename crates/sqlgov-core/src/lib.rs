//! # sqlgov Core
//!
//! Filter-matching engine for SQL governance.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Blacklist filtering** - SQL text, fingerprint, IP, CIDR, host and instance rules
//! - **SQL whitelist** - exact and fingerprint matching with an injected normalizer
//! - **Audit-plan batches** - per-project blacklist filtering with match tallies
//! - **Configuration** - TOML configuration and rule files
//!
//! ## Example
//!
//! ```rust
//! use sqlgov_core::filter::{BlackFilter, FilterRule, FilterType};
//!
//! let rules = vec![
//!     FilterRule::new(1, FilterType::Sql, "table_1"),
//!     FilterRule::new(2, FilterType::Cidr, "10.100.0.0/16"),
//! ];
//! let filter = BlackFilter::new(&rules);
//!
//! assert!(filter.is_sql_in_blacklist("DELETE From tAble_1"));
//! assert!(filter.has_endpoint_in_blacklist(&["10.100.25.45"]));
//! assert!(!filter.has_endpoint_in_blacklist(&["172.30.1.2"]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audit_plan;
pub mod config;
pub mod error;
pub mod filter;
pub mod source;
pub mod whitelist;

// Re-exports for convenience
pub use audit_plan::{AuditCandidate, BatchOutcome, BlacklistBatch, MatchTally, RuleSource, StaticRuleSource};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{BlackFilter, FilterRule, FilterType, RuleSet};
pub use source::RuleFile;
pub use whitelist::{Fingerprinter, SqlWhitelist, WhitelistEntry, WhitelistMatchType};
