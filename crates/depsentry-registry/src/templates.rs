//! Built-in policy templates.
//!
//! Keep these small and readable. Anything organization-specific belongs in
//! explicitly authored policies.

use depsentry_types::{
    Action, ActionConfig, ActionType, Condition, ConditionOperator, EnforcementMode, LogLevel,
    Policy, PolicyMetadata, PolicyScope, Rule, RuleMetadata, RuleType, Severity, ids,
};
use serde_json::json;

use crate::error::PolicyError;

/// The ids accepted by [`instantiate_template`].
pub fn template_ids() -> &'static [&'static str] {
    &[
        ids::TEMPLATE_CRITICAL_VULNERABILITY_BLOCK,
        ids::TEMPLATE_LICENSE_ALLOWLIST,
        ids::TEMPLATE_STALE_MAINTENANCE_WARN,
    ]
}

/// Build a policy from a built-in template for one tenant.
pub fn instantiate_template(
    template_id: &str,
    tenant_id: &str,
    policy_id: &str,
) -> Result<Policy, PolicyError> {
    let (name, rule) = match template_id {
        ids::TEMPLATE_CRITICAL_VULNERABILITY_BLOCK => (
            "Block critical vulnerabilities",
            critical_vulnerability_rule(),
        ),
        ids::TEMPLATE_LICENSE_ALLOWLIST => ("License allowlist", license_allowlist_rule()),
        ids::TEMPLATE_STALE_MAINTENANCE_WARN => {
            ("Warn on stale maintenance", stale_maintenance_rule())
        }
        other => {
            return Err(PolicyError::UnknownTemplate {
                template_id: other.to_string(),
            });
        }
    };

    Ok(Policy {
        id: policy_id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: name.to_string(),
        description: Some(format!("Instantiated from template '{template_id}'")),
        version: "1.0.0".to_string(),
        enabled: true,
        priority: 0,
        scope: PolicyScope::default(),
        rules: vec![rule],
        enforcement_mode: EnforcementMode::Enforcing,
        exceptions: Vec::new(),
        metadata: PolicyMetadata::default(),
    })
}

fn critical_vulnerability_rule() -> Rule {
    Rule {
        id: "block-critical-vulnerability".to_string(),
        name: "block critical vulnerability".to_string(),
        rule_type: RuleType::Vulnerability,
        severity: Severity::Critical,
        enabled: true,
        conditions: vec![Condition {
            field: "vulnerability.severity".to_string(),
            operator: ConditionOperator::Equals,
            value: json!("critical"),
            logical: None,
        }],
        actions: vec![
            action(ActionType::Block),
            Action {
                action_type: ActionType::Log,
                enabled: true,
                config: ActionConfig {
                    log_level: Some(LogLevel::Error),
                    ..ActionConfig::default()
                },
            },
        ],
        metadata: RuleMetadata {
            tags: vec!["security".to_string()],
            rationale: Some("Critical advisories must never reach production".to_string()),
            impact: None,
        },
    }
}

fn license_allowlist_rule() -> Rule {
    Rule {
        id: "license-allowlist".to_string(),
        name: "license allowlist".to_string(),
        rule_type: RuleType::License,
        severity: Severity::High,
        enabled: true,
        conditions: vec![Condition {
            field: "license".to_string(),
            operator: ConditionOperator::NotIn,
            value: json!(["MIT", "Apache-2.0", "BSD-3-Clause", "ISC"]),
            logical: None,
        }],
        actions: vec![action(ActionType::Warn), action(ActionType::Notify)],
        metadata: RuleMetadata {
            tags: vec!["legal".to_string()],
            rationale: Some("Only pre-cleared licenses are approved for distribution".to_string()),
            impact: None,
        },
    }
}

fn stale_maintenance_rule() -> Rule {
    Rule {
        id: "stale-maintenance".to_string(),
        name: "stale maintenance".to_string(),
        rule_type: RuleType::Maintenance,
        severity: Severity::Medium,
        enabled: true,
        conditions: vec![Condition {
            field: "days_since_last_update".to_string(),
            operator: ConditionOperator::GreaterThan,
            value: json!(730),
            logical: None,
        }],
        actions: vec![action(ActionType::Warn)],
        metadata: RuleMetadata {
            tags: vec!["hygiene".to_string()],
            rationale: Some("Two years without a release suggests abandonment".to_string()),
            impact: None,
        },
    }
}

fn action(action_type: ActionType) -> Action {
    Action {
        action_type,
        enabled: true,
        config: ActionConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_policy;

    #[test]
    fn every_builtin_template_produces_a_valid_policy() {
        for template_id in template_ids() {
            let policy = instantiate_template(template_id, "tenant-1", "p1")
                .unwrap_or_else(|e| panic!("instantiate {template_id}: {e}"));
            validate_policy(&policy).unwrap_or_else(|e| panic!("validate {template_id}: {e}"));
        }
    }
}
