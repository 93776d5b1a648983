//! Structural policy validation.
//!
//! Everything here fails fast at creation time so that the engine can treat
//! stored policies as well-formed: unknown condition fields, malformed
//! `matches` patterns, and incomplete action configs never reach evaluation.

use depsentry_engine::facts;
use depsentry_types::{ActionType, ConditionOperator, Policy, Rule};
use regex::Regex;

use crate::error::PolicyError;

pub fn validate_policy(policy: &Policy) -> Result<(), PolicyError> {
    if policy.rules.is_empty() {
        return Err(PolicyError::NoRules {
            policy_id: policy.id.clone(),
        });
    }
    parse_version(&policy.version)?;
    for rule in &policy.rules {
        validate_rule(rule)?;
    }
    Ok(())
}

fn validate_rule(rule: &Rule) -> Result<(), PolicyError> {
    if rule.conditions.is_empty() {
        return Err(PolicyError::RuleWithoutConditions {
            rule_id: rule.id.clone(),
        });
    }
    if rule.actions.is_empty() {
        return Err(PolicyError::RuleWithoutActions {
            rule_id: rule.id.clone(),
        });
    }

    for condition in &rule.conditions {
        if !facts::is_known_field(&condition.field) {
            return Err(PolicyError::UnknownField {
                rule_id: rule.id.clone(),
                field: condition.field.clone(),
            });
        }
        if condition.operator == ConditionOperator::Matches {
            let pattern = condition.value.as_str().unwrap_or_default();
            if pattern.is_empty() || Regex::new(pattern).is_err() {
                return Err(PolicyError::InvalidRegex {
                    rule_id: rule.id.clone(),
                    field: condition.field.clone(),
                    pattern: condition.value.to_string(),
                });
            }
        }
    }

    for action in &rule.actions {
        match action.action_type {
            ActionType::CreateIssue if action.config.issue_tracker.is_none() => {
                return Err(PolicyError::MissingIssueTracker {
                    rule_id: rule.id.clone(),
                });
            }
            ActionType::Escalate if action.config.escalation_level == Some(0) => {
                return Err(PolicyError::InvalidEscalationLevel {
                    rule_id: rule.id.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Parse a `MAJOR.MINOR.PATCH` version string.
pub(crate) fn parse_version(version: &str) -> Result<(u64, u64, u64), PolicyError> {
    let invalid = || PolicyError::InvalidVersion {
        version: version.to_string(),
    };
    let mut parts = version.split('.');
    let mut next = || -> Result<u64, PolicyError> {
        parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)
    };
    let parsed = (next()?, next()?, next()?);
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Bump the patch component of a `MAJOR.MINOR.PATCH` version.
pub(crate) fn bump_patch(version: &str) -> Result<String, PolicyError> {
    let (major, minor, patch) = parse_version(version)?;
    Ok(format!("{major}.{minor}.{}", patch + 1))
}
