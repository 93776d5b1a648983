//! Shared builders for registry tests.

use depsentry_types::{
    Action, ActionConfig, ActionType, Condition, ConditionOperator, EnforcementMode, Policy,
    PolicyMetadata, PolicyScope, Rule, RuleMetadata, RuleType, Severity,
};
use serde_json::json;

pub fn rule_with(actions: Vec<Action>) -> Rule {
    Rule {
        id: "r1".to_string(),
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
        actions,
        metadata: RuleMetadata::default(),
    }
}

pub fn minimal_policy(id: &str) -> Policy {
    Policy {
        id: id.to_string(),
        tenant_id: "tenant-1".to_string(),
        name: format!("policy {id}"),
        description: None,
        version: "1.0.0".to_string(),
        enabled: true,
        priority: 0,
        scope: PolicyScope::default(),
        rules: vec![rule_with(vec![Action {
            action_type: ActionType::Block,
            enabled: true,
            config: ActionConfig::default(),
        }])],
        enforcement_mode: EnforcementMode::Enforcing,
        exceptions: Vec::new(),
        metadata: PolicyMetadata::default(),
    }
}
