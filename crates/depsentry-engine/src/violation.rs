//! Violation construction.
//!
//! Everything here is a pure function of its inputs: the message, evidence,
//! impact, and recommendation are templated by rule type, and the violation
//! id is a content hash, so rebuilding from the same inputs yields the same
//! record.

use depsentry_types::{
    Dependency, EvaluationContext, Evidence, EvidenceType, Policy, Rule, RuleType, Violation,
    ViolationContext, ViolationDetails, ViolationStatus,
};
use time::OffsetDateTime;

use crate::fingerprint;
use crate::rule::RuleOutcome;

/// Build the immutable violation record for a triggered rule.
pub fn build_violation(
    policy: &Policy,
    rule: &Rule,
    dependency: &Dependency,
    outcome: &RuleOutcome,
    context: &EvaluationContext,
    now: OffsetDateTime,
) -> Violation {
    let evidence = outcome
        .triggered_conditions
        .iter()
        .map(|cond| Evidence {
            evidence_type: EvidenceType::Configuration,
            field: cond.field.clone(),
            operator: cond.operator.as_str().to_string(),
            expected: cond.value.clone(),
            actual: outcome
                .actual_values
                .get(&cond.field)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        })
        .collect();

    Violation {
        id: fingerprint::violation_id(
            &policy.tenant_id,
            &policy.id,
            &rule.id,
            &dependency.name,
            &dependency.version,
        ),
        tenant_id: policy.tenant_id.clone(),
        policy_id: policy.id.clone(),
        rule_id: rule.id.clone(),
        dependency: dependency.clone(),
        violation_type: rule.rule_type,
        severity: rule.severity,
        message: message_for(rule, dependency),
        details: ViolationDetails {
            rule_name: rule.name.clone(),
            triggered_conditions: outcome.triggered_conditions.clone(),
            actual_values: outcome.actual_values.clone(),
            evidence,
            impact: impact_for(rule),
            recommendation: recommendation_for(rule, dependency),
            tags: rule.metadata.tags.clone(),
        },
        context: ViolationContext {
            project: context.project.clone(),
            environment: context.environment.clone(),
            ecosystem: dependency.ecosystem.clone(),
            package_file: dependency.package_file.clone(),
            scan_id: context.scan_id.clone(),
            build_id: context.build_id.clone(),
            commit_id: context.commit_id.clone(),
            pull_request_id: context.pull_request_id.clone(),
        },
        status: ViolationStatus::Open,
        detected_at: now,
        resolved_at: None,
        resolution_note: None,
    }
}

fn message_for(rule: &Rule, dep: &Dependency) -> String {
    let subject = format!("{}@{}", dep.name, dep.version);
    match rule.rule_type {
        RuleType::Vulnerability => format!(
            "{subject} carries a vulnerability matching rule '{}'",
            rule.name
        ),
        RuleType::License => format!(
            "{subject} uses a license disallowed by rule '{}'",
            rule.name
        ),
        RuleType::Age => format!("{subject} is older than permitted by rule '{}'", rule.name),
        RuleType::Maintenance => format!(
            "{subject} shows stale maintenance per rule '{}'",
            rule.name
        ),
        RuleType::Configuration | RuleType::Custom => {
            format!("{subject} violates rule '{}'", rule.name)
        }
    }
}

fn impact_for(rule: &Rule) -> String {
    if let Some(impact) = &rule.metadata.impact {
        return impact.clone();
    }
    match rule.rule_type {
        RuleType::Vulnerability => {
            "Known security vulnerability exposed to builds consuming this dependency".to_string()
        }
        RuleType::License => "License obligations may conflict with distribution terms".to_string(),
        RuleType::Age => "Outdated releases miss upstream fixes and hardening".to_string(),
        RuleType::Maintenance => {
            "Unmaintained dependencies accumulate unpatched defects".to_string()
        }
        RuleType::Configuration | RuleType::Custom => {
            "Dependency configuration drifts from organizational policy".to_string()
        }
    }
}

fn recommendation_for(rule: &Rule, dep: &Dependency) -> String {
    match rule.rule_type {
        RuleType::Vulnerability => {
            let fix = dep
                .vulnerabilities
                .iter()
                .max_by_key(|v| v.severity)
                .and_then(|v| v.fix_version.as_deref());
            match fix {
                Some(version) => format!("Upgrade {} to {version} or later", dep.name),
                None => format!("Upgrade {} to a patched release", dep.name),
            }
        }
        RuleType::License => format!("Replace {} with an approved-license alternative", dep.name),
        RuleType::Age => format!("Update {} to a current release", dep.name),
        RuleType::Maintenance => format!(
            "Review the maintenance status of {} or replace it",
            dep.name
        ),
        RuleType::Configuration | RuleType::Custom => {
            format!("Review {} against the conditions of '{}'", dep.name, rule.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactRecord;
    use crate::rule::{self, FoldMode};
    use crate::test_support::{
        block_rule, context, policy_with_rules, vulnerable_dependency,
    };
    use depsentry_types::Severity;
    use serde_json::json;
    use time::macros::datetime;

    fn built() -> Violation {
        let now = datetime!(2026-01-01 00:00 UTC);
        let rule = block_rule("no-critical");
        let policy = policy_with_rules("p1", vec![rule.clone()]);
        let dep = vulnerable_dependency("lodash", "4.17.20", Severity::Critical);
        let facts = FactRecord::build(&dep, &context(None, None), rule.rule_type, now);
        let outcome = rule::evaluate(&rule, &facts, FoldMode::Sequential);
        assert!(outcome.triggered);
        build_violation(&policy, &rule, &dep, &outcome, &context(None, None), now)
    }

    #[test]
    fn message_and_recommendation_follow_rule_type() {
        let violation = built();
        assert!(violation.message.contains("lodash@4.17.20"));
        assert!(violation.message.contains("vulnerability"));
        assert!(violation.details.recommendation.contains("patched release"));
        assert_eq!(violation.status, ViolationStatus::Open);
    }

    #[test]
    fn evidence_carries_field_operator_expected_actual() {
        let violation = built();
        assert_eq!(violation.details.evidence.len(), 1);
        let ev = &violation.details.evidence[0];
        assert_eq!(ev.evidence_type, EvidenceType::Configuration);
        assert_eq!(ev.field, "vulnerability.severity");
        assert_eq!(ev.operator, "equals");
        assert_eq!(ev.expected, json!("critical"));
        assert_eq!(ev.actual, json!("critical"));
    }

    #[test]
    fn rebuilding_from_the_same_inputs_is_identical() {
        assert_eq!(built(), built());
    }
}
