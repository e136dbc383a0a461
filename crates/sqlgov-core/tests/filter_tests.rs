//! Integration tests for blacklist and whitelist evaluation

use sqlgov_core::filter::{BlackFilter, FilterRule, FilterType};
use sqlgov_core::{BlacklistBatch, AuditCandidate, RuleFile, SqlWhitelist};
use std::sync::Arc;
use std::thread;

fn rules(specs: &[(FilterType, &str)]) -> Vec<FilterRule> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(kind, content))| FilterRule::new(i as u64 + 1, kind, content))
        .collect()
}

// ============ SQL Matching ============

#[test]
fn test_sql_rules_scenario() {
    let filter = BlackFilter::new(&rules(&[(FilterType::Sql, "SELECT"), (FilterType::Sql, "table_1")]));

    assert!(filter.is_sql_in_blacklist("SELECT * FROM users"));
    assert!(filter.is_sql_in_blacklist("DELETE From tAble_1"));
    assert!(!filter.is_sql_in_blacklist("SHOW CREATE TABLE table_2"));
}

#[test]
fn test_non_ascii_case_folding_never_expands() {
    let filter = BlackFilter::new(&rules(&[(FilterType::Sql, "straße"), (FilterType::Sql, "ss")]));
    assert!(!filter.is_sql_in_blacklist("select * from STRASSE"));
    assert!(!filter.is_sql_in_blacklist("select 'ß'"));
    assert_eq!(filter.matched_sql("SELECT * FROM STRAßE"), Some(1));

    let filter = BlackFilter::new(&rules(&[(FilterType::Host, "i")]));
    assert!(!filter.has_endpoint_in_blacklist(&["DB.İZMR"]));
    assert!(filter.has_endpoint_in_blacklist(&["DB.IZMIR"]));
}

#[test]
fn test_sql_rule_with_regex_metacharacters_is_literal() {
    let filter = BlackFilter::new(&rules(&[(FilterType::Sql, "where id in (?)")]));

    assert!(filter.is_sql_in_blacklist("SELECT * FROM t WHERE id IN (?)"));
    assert!(!filter.is_sql_in_blacklist("SELECT * FROM t WHERE id IN (1)"));
}

// ============ Endpoint Matching ============

#[test]
fn test_cidr_rules_scenario() {
    let filter = BlackFilter::new(&rules(&[
        (FilterType::Cidr, "192.168.0.0/24"),
        (FilterType::Cidr, "10.100.0.0/16"),
    ]));

    assert!(filter.has_endpoint_in_blacklist(&["10.100.25.45"]));
    assert!(!filter.has_endpoint_in_blacklist(&["172.30.1.2"]));
}

#[test]
fn test_cidr_block_boundaries() {
    let filter = BlackFilter::new(&rules(&[(FilterType::Cidr, "10.100.0.0/16")]));

    assert!(filter.has_endpoint_in_blacklist(&["10.100.0.0"]));
    assert!(filter.has_endpoint_in_blacklist(&["10.100.255.255"]));
    assert!(!filter.has_endpoint_in_blacklist(&["10.99.255.255"]));
    assert!(!filter.has_endpoint_in_blacklist(&["10.101.0.0"]));
}

#[test]
fn test_cidr_ipv6_block() {
    let filter = BlackFilter::new(&rules(&[(FilterType::Cidr, "fd00:10::/64")]));

    assert!(filter.has_endpoint_in_blacklist(&["fd00:10::42"]));
    assert!(!filter.has_endpoint_in_blacklist(&["fd00:11::42"]));
    assert!(!filter.has_endpoint_in_blacklist(&["10.0.0.1"]));
}

#[test]
fn test_malformed_cidr_does_not_poison_rule_set() {
    let filter = BlackFilter::new(&rules(&[
        (FilterType::Cidr, "10.100.0.0/16/8"),
        (FilterType::Cidr, "192.168.0.0/24"),
        (FilterType::Sql, "drop"),
    ]));

    assert!(filter.has_endpoint_in_blacklist(&["192.168.0.10"]));
    assert!(filter.is_sql_in_blacklist("DROP TABLE t"));
    assert_eq!(filter.rule_set().skipped(), 1);
}

#[test]
fn test_host_rules_scenario() {
    let filter = BlackFilter::new(&rules(&[(FilterType::Host, "host"), (FilterType::Host, "some_site")]));

    assert!(filter.has_endpoint_in_blacklist(&["any_Host.io"]));
    assert!(filter.has_endpoint_in_blacklist(&["some_Site.org/home/"]));
    assert!(!filter.has_endpoint_in_blacklist(&["other_site/home"]));
    assert!(!filter.has_endpoint_in_blacklist(&["any_other_site/local"]));
}

#[test]
fn test_mixed_kinds_any_identifier() {
    let filter = BlackFilter::new(&rules(&[
        (FilterType::Ip, "10.0.5.67"),
        (FilterType::Cidr, "192.168.0.0/24"),
        (FilterType::Host, "bastion"),
    ]));

    assert!(filter.has_endpoint_in_blacklist(&["8.8.8.8", "Bastion-01.corp"]));
    assert!(filter.has_endpoint_in_blacklist(&["app.corp", "192.168.0.3"]));
    assert!(filter.has_endpoint_in_blacklist(&["10.0.5.67"]));
    assert!(!filter.has_endpoint_in_blacklist(&["8.8.8.8", "app.corp"]));
    assert!(!filter.has_endpoint_in_blacklist(&["", "  "]));
}

// ============ Degraded Input ============

#[test]
fn test_empty_rule_set_never_matches() {
    let filter = BlackFilter::new(&[]);

    assert!(!filter.is_sql_in_blacklist("select 1"));
    assert!(!filter.has_endpoint_in_blacklist(&["10.0.0.1"]));
    assert_eq!(filter.matched_audit_sql(&["10.0.0.1"], "select 1", Some("select ?"), Some("db")), None);
}

#[test]
fn test_empty_content_is_not_a_wildcard() {
    let filter = BlackFilter::new(&rules(&[
        (FilterType::Sql, ""),
        (FilterType::Host, ""),
        (FilterType::Ip, ""),
    ]));

    assert!(!filter.is_sql_in_blacklist("select 1"));
    assert!(!filter.has_endpoint_in_blacklist(&["", "db.local"]));
}

// ============ Concurrency ============

#[test]
fn test_shared_filter_across_threads() {
    let filter = Arc::new(BlackFilter::new(&rules(&[
        (FilterType::Sql, "select"),
        (FilterType::Cidr, "10.0.0.0/8"),
    ])));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                let addr = format!("10.0.0.{i}");
                filter.is_sql_in_blacklist("SELECT 1") && filter.has_endpoint_in_blacklist(&[addr])
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

// ============ Rule Files ============

#[test]
fn test_rule_file_drives_blacklist_and_whitelist() {
    let file = RuleFile::from_toml(
        r#"
[[blacklist]]
id = 7
type = "host"
content = "monitor"

[[blacklist]]
id = 8
type = "instance"
content = "mysql-sandbox"

[[whitelist]]
id = 1
value = "select 1"
"#,
    )
    .unwrap();

    let outcome = BlacklistBatch::new(&file)
        .filter(vec![
            AuditCandidate {
                project_id: "p1".into(),
                instance_name: "mysql-prod".into(),
                sql_text: "select * from orders".into(),
                fingerprint: None,
                endpoints: vec!["10.1.1.1".into(), "Monitor-03.corp".into()],
            },
            AuditCandidate {
                project_id: "p1".into(),
                instance_name: "mysql-sandbox".into(),
                sql_text: "select * from orders".into(),
                fingerprint: None,
                endpoints: vec![],
            },
            AuditCandidate {
                project_id: "p1".into(),
                instance_name: "mysql-prod".into(),
                sql_text: "select * from orders".into(),
                fingerprint: None,
                endpoints: vec!["10.1.1.1".into()],
            },
        ])
        .unwrap();

    assert_eq!(outcome.kept.len(), 1);
    assert_eq!(outcome.tally.counts.get(&7), Some(&1));
    assert_eq!(outcome.tally.counts.get(&8), Some(&1));

    let whitelist = SqlWhitelist::new(&file.whitelist, None);
    assert!(whitelist.is_whitelisted("SELECT 1"));
}
