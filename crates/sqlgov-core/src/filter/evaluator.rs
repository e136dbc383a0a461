//! Blacklist evaluation
//!
//! [`BlackFilter`] answers the audit-plan questions: is this SQL text
//! blacklisted, and does any of these endpoint identifiers hit the
//! blacklist. Every check is a pure function of the rule snapshot and the
//! candidate; nothing here allocates shared state or fails.

use super::matcher::Probe;
use super::rule::{FilterRule, FilterType};
use super::rule_set::RuleSet;
use tracing::debug;

/// Blacklist evaluator over one rule snapshot
#[derive(Debug, Clone, Default)]
pub struct BlackFilter {
    rules: RuleSet,
}

impl BlackFilter {
    /// Build an evaluator from persisted rules
    pub fn new(rules: &[FilterRule]) -> Self {
        Self {
            rules: RuleSet::new(rules),
        }
    }

    /// The underlying rule set
    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    /// Check whether `sql` contains any `sql` or `fp_sql` rule, ignoring case
    pub fn is_sql_in_blacklist(&self, sql: &str) -> bool {
        self.matched_sql(sql).is_some()
    }

    /// Id of the first `sql`/`fp_sql` rule contained in `sql`
    pub fn matched_sql(&self, sql: &str) -> Option<u64> {
        self.find(&FilterType::SQL_KINDS, sql)
    }

    /// Check a precomputed fingerprint against `fp_sql` rules only
    pub fn is_fingerprint_in_blacklist(&self, fingerprint: &str) -> bool {
        self.matched_fingerprint(fingerprint).is_some()
    }

    /// Id of the first `fp_sql` rule contained in `fingerprint`
    pub fn matched_fingerprint(&self, fingerprint: &str) -> Option<u64> {
        self.find(&[FilterType::FpSql], fingerprint)
    }

    /// Check an instance name against `instance` rules (exact match)
    pub fn is_instance_in_blacklist(&self, instance: &str) -> bool {
        self.matched_instance(instance).is_some()
    }

    /// Id of the `instance` rule equal to `instance`
    pub fn matched_instance(&self, instance: &str) -> Option<u64> {
        self.find(&[FilterType::Instance], instance)
    }

    /// Check whether any representation of an endpoint is blacklisted.
    ///
    /// `identifiers` are alternative forms of the same endpoint (address,
    /// hostname, ...); a hit on any one of them is enough.
    pub fn has_endpoint_in_blacklist<S: AsRef<str>>(&self, identifiers: &[S]) -> bool {
        self.matched_endpoint(identifiers).is_some()
    }

    /// Id of the first `ip`/`cidr`/`host` rule hit by any identifier
    pub fn matched_endpoint<S: AsRef<str>>(&self, identifiers: &[S]) -> Option<u64> {
        identifiers
            .iter()
            .find_map(|id| self.find(&FilterType::ENDPOINT_KINDS, id.as_ref()))
    }

    /// Full audit-plan check for one collected statement.
    ///
    /// Tries endpoints, then SQL text, then fingerprint, then instance name,
    /// and reports the first rule that matched.
    pub fn matched_audit_sql<S: AsRef<str>>(
        &self,
        endpoints: &[S],
        sql: &str,
        fingerprint: Option<&str>,
        instance: Option<&str>,
    ) -> Option<u64> {
        if self.rules.is_empty() {
            return None;
        }

        self.matched_endpoint(endpoints)
            .or_else(|| self.matched_sql(sql))
            .or_else(|| fingerprint.and_then(|fp| self.matched_fingerprint(fp)))
            .or_else(|| instance.and_then(|name| self.matched_instance(name)))
    }

    fn find(&self, kinds: &[FilterType], candidate: &str) -> Option<u64> {
        if kinds.iter().all(|&kind| self.rules.count(kind) == 0) {
            return None;
        }

        let probe = Probe::new(candidate);
        let hit = self.rules.find(kinds, &probe)?;
        debug!(id = hit.id, candidate, "Matched blacklist rule");
        Some(hit.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(rules: &[(u64, FilterType, &str)]) -> BlackFilter {
        let rules: Vec<FilterRule> = rules
            .iter()
            .map(|&(id, kind, content)| FilterRule::new(id, kind, content))
            .collect();
        BlackFilter::new(&rules)
    }

    #[test]
    fn test_sql_scenario() {
        let f = filter(&[(1, FilterType::Sql, "SELECT"), (2, FilterType::Sql, "table_1")]);

        assert!(f.is_sql_in_blacklist("SELECT * FROM users"));
        assert!(f.is_sql_in_blacklist("DELETE From tAble_1"));
        assert!(!f.is_sql_in_blacklist("SHOW CREATE TABLE table_2"));
        assert_eq!(f.matched_sql("DELETE From tAble_1"), Some(2));
    }

    #[test]
    fn test_fp_sql_checked_by_sql_matcher() {
        let f = filter(&[(9, FilterType::FpSql, "select * from t1 where id=?")]);

        assert_eq!(f.matched_sql("SELECT * FROM t1 WHERE id=?"), Some(9));
        assert_eq!(f.matched_fingerprint("select * from t1 where id=?"), Some(9));
    }

    #[test]
    fn test_fingerprint_ignores_sql_rules() {
        let f = filter(&[(1, FilterType::Sql, "select")]);
        assert!(!f.is_fingerprint_in_blacklist("select * from t1"));
    }

    #[test]
    fn test_no_sql_rules() {
        let f = filter(&[(1, FilterType::Host, "select")]);
        assert!(!f.is_sql_in_blacklist("select 1"));
        assert!(!BlackFilter::default().is_sql_in_blacklist("select 1"));
    }

    #[test]
    fn test_cidr_scenario() {
        let f = filter(&[
            (1, FilterType::Cidr, "192.168.0.0/24"),
            (2, FilterType::Cidr, "10.100.0.0/16"),
        ]);

        assert!(f.has_endpoint_in_blacklist(&["10.100.25.45"]));
        assert!(!f.has_endpoint_in_blacklist(&["172.30.1.2"]));
        assert_eq!(f.matched_endpoint(&["192.168.0.7"]), Some(1));
    }

    #[test]
    fn test_host_scenario() {
        let f = filter(&[(1, FilterType::Host, "host"), (2, FilterType::Host, "some_site")]);

        for hit in ["local_host", "local_Host.com", "any_Host.io", "some_Site.org/home/", "Some_site.cn/mysql"] {
            assert!(f.has_endpoint_in_blacklist(&[hit]), "{hit} should match");
        }
        for miss in ["other_site/home", "any_other_site/local"] {
            assert!(!f.has_endpoint_in_blacklist(&[miss]), "{miss} should not match");
        }
    }

    #[test]
    fn test_identifiers_are_or_combined() {
        let f = filter(&[(1, FilterType::Ip, "10.0.5.67"), (2, FilterType::Host, "db-prod")]);

        assert!(f.has_endpoint_in_blacklist(&["172.16.0.1", "DB-PROD.internal"]));
        assert!(f.has_endpoint_in_blacklist(&["10.0.5.67", "unrelated"]));
        assert!(!f.has_endpoint_in_blacklist(&["172.16.0.1", "db-test"]));
        assert!(!f.has_endpoint_in_blacklist::<&str>(&[]));
    }

    #[test]
    fn test_ip_rules_are_literal() {
        let f = filter(&[(1, FilterType::Ip, "10.0.5.67")]);

        assert!(f.has_endpoint_in_blacklist(&["10.0.5.67"]));
        assert!(!f.has_endpoint_in_blacklist(&["10.0.5.67x"]));
        assert!(!f.has_endpoint_in_blacklist(&["10.0.5.6"]));
    }

    #[test]
    fn test_instance_is_exact() {
        let f = filter(&[(4, FilterType::Instance, "mysql-prod")]);

        assert_eq!(f.matched_instance("mysql-prod"), Some(4));
        assert!(!f.is_instance_in_blacklist("mysql-prod-2"));
        assert!(!f.has_endpoint_in_blacklist(&["mysql-prod"]));
    }

    #[test]
    fn test_audit_sql_order() {
        let f = filter(&[
            (1, FilterType::Instance, "mysql-prod"),
            (2, FilterType::FpSql, "from t1"),
            (3, FilterType::Sql, "select"),
            (4, FilterType::Host, "db"),
        ]);

        assert_eq!(f.matched_audit_sql(&["db.local"], "select 1", None, Some("mysql-prod")), Some(4));
        assert_eq!(f.matched_audit_sql(&["10.0.0.1"], "SELECT 1", None, Some("mysql-prod")), Some(3));
        assert_eq!(f.matched_audit_sql(&["10.0.0.1"], "update t2", Some("update t1 from t1"), None), Some(2));
        assert_eq!(f.matched_audit_sql(&["10.0.0.1"], "update t2", None, Some("mysql-prod")), Some(1));
        assert_eq!(f.matched_audit_sql(&["10.0.0.1"], "update t2", None, None), None);
    }

    #[test]
    fn test_unsupported_rules_never_match() {
        let f = filter(&[(1, FilterType::Unsupported, "select")]);
        assert!(!f.is_sql_in_blacklist("select 1"));
        assert_eq!(f.rule_set().skipped(), 1);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let f = filter(&[(1, FilterType::Sql, "select"), (2, FilterType::Cidr, "10.0.0.0/8")]);

        for _ in 0..3 {
            assert!(f.is_sql_in_blacklist("select 1"));
            assert!(f.has_endpoint_in_blacklist(&["10.1.1.1"]));
            assert!(!f.has_endpoint_in_blacklist(&["11.1.1.1"]));
        }
    }
}
