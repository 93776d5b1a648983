//! Shared builders for engine tests.

use depsentry_types::{
    Action, ActionConfig, ActionType, Condition, ConditionOperator, Dependency, DependencyKind,
    EnforcementMode, EvaluationContext, ExceptionStatus, LogicalOperator, Policy,
    PolicyException, PolicyMetadata, PolicyScope, Rule, RuleMetadata, RuleType, Severity,
    UsageScope, Violation, Vulnerability,
};
use serde_json::{Value as JsonValue, json};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::facts::FactRecord;
use crate::rule::FoldMode;

pub fn dependency(name: &str, version: &str) -> Dependency {
    Dependency {
        name: name.to_string(),
        version: version.to_string(),
        kind: DependencyKind::Direct,
        usage_scope: UsageScope::Production,
        ecosystem: "npm".to_string(),
        package_file: "package.json".to_string(),
        licenses: vec!["MIT".to_string()],
        last_update: None,
        vulnerabilities: Vec::new(),
    }
}

pub fn vulnerable_dependency(name: &str, version: &str, severity: Severity) -> Dependency {
    let mut dep = dependency(name, version);
    dep.vulnerabilities = vec![Vulnerability {
        id: "CVE-2026-0001".to_string(),
        severity,
        title: Some("test advisory".to_string()),
        cvss_score: Some(9.1),
        fix_version: Some("4.17.21".to_string()),
    }];
    dep
}

pub fn context(project: Option<&str>, environment: Option<&str>) -> EvaluationContext {
    EvaluationContext {
        project: project.map(str::to_string),
        environment: environment.map(str::to_string),
        ..EvaluationContext::default()
    }
}

pub fn condition(field: &str, operator: ConditionOperator, value: JsonValue) -> Condition {
    Condition {
        field: field.to_string(),
        operator,
        value,
        logical: None,
    }
}

pub fn condition_chain(
    specs: &[(&str, ConditionOperator, JsonValue, Option<LogicalOperator>)],
) -> Vec<Condition> {
    specs
        .iter()
        .map(|(field, operator, value, logical)| Condition {
            field: field.to_string(),
            operator: *operator,
            value: value.clone(),
            logical: *logical,
        })
        .collect()
}

pub fn action_of(action_type: ActionType) -> Action {
    Action {
        action_type,
        enabled: true,
        config: ActionConfig::default(),
    }
}

pub fn chain_rule(conditions: Vec<Condition>) -> Rule {
    Rule {
        id: "chain".to_string(),
        name: "chain rule".to_string(),
        rule_type: RuleType::Custom,
        severity: Severity::Medium,
        enabled: true,
        conditions,
        actions: vec![action_of(ActionType::Log)],
        metadata: RuleMetadata::default(),
    }
}

/// Vulnerability rule: `vulnerability.severity equals critical`, block.
pub fn block_rule(id: &str) -> Rule {
    Rule {
        id: id.to_string(),
        name: "block critical vulnerability".to_string(),
        rule_type: RuleType::Vulnerability,
        severity: Severity::Critical,
        enabled: true,
        conditions: vec![condition(
            "vulnerability.severity",
            ConditionOperator::Equals,
            json!("critical"),
        )],
        actions: vec![action_of(ActionType::Block)],
        metadata: RuleMetadata {
            tags: vec!["security".to_string()],
            ..RuleMetadata::default()
        },
    }
}

/// Maintenance rule: `days_since_last_update greater_than 730`, warn only.
pub fn maintenance_warn_rule(id: &str) -> Rule {
    Rule {
        id: id.to_string(),
        name: "stale maintenance".to_string(),
        rule_type: RuleType::Maintenance,
        severity: Severity::Medium,
        enabled: true,
        conditions: vec![condition(
            "days_since_last_update",
            ConditionOperator::GreaterThan,
            json!(730),
        )],
        actions: vec![action_of(ActionType::Warn)],
        metadata: RuleMetadata::default(),
    }
}

pub fn policy_with_rules(id: &str, rules: Vec<Rule>) -> Policy {
    Policy {
        id: id.to_string(),
        tenant_id: "tenant-1".to_string(),
        name: format!("policy {id}"),
        description: None,
        version: "1.0.0".to_string(),
        enabled: true,
        priority: 0,
        scope: PolicyScope::default(),
        rules,
        enforcement_mode: EnforcementMode::Enforcing,
        exceptions: Vec::new(),
        metadata: PolicyMetadata::default(),
    }
}

pub fn exception(rule_id: &str, dependency: &str, expires_at: OffsetDateTime) -> PolicyException {
    PolicyException {
        id: format!("exc-{rule_id}-{dependency}"),
        rule_id: rule_id.to_string(),
        dependency: dependency.to_string(),
        justification: "accepted risk".to_string(),
        approved_by: "security-team".to_string(),
        approved_at: datetime!(2025-06-01 00:00 UTC),
        expires_at,
        status: ExceptionStatus::Active,
    }
}

pub fn facts_with(pairs: &[(&str, JsonValue)]) -> FactRecord {
    FactRecord::from_pairs(pairs)
}

pub fn sample_violation() -> Violation {
    let now = datetime!(2026-01-01 00:00 UTC);
    let rule = block_rule("no-critical");
    let policy = policy_with_rules("p1", vec![rule.clone()]);
    let dep = vulnerable_dependency("lodash", "4.17.20", Severity::Critical);
    let facts = FactRecord::build(&dep, &EvaluationContext::default(), rule.rule_type, now);
    let outcome = crate::rule::evaluate(&rule, &facts, FoldMode::Sequential);
    crate::violation::build_violation(
        &policy,
        &rule,
        &dep,
        &outcome,
        &EvaluationContext::default(),
        now,
    )
}
