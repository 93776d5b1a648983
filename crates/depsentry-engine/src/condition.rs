//! Single-condition evaluation.
//!
//! Operators are total: a type mismatch (string operator on a number,
//! numeric operator on a string) evaluates to `false`, never to an error.
//! Malformed regexes in `matches` also evaluate to `false`; validation
//! rejects them at policy-creation time, so hitting one here means the
//! policy bypassed the registry.

use depsentry_types::{Condition, ConditionOperator};
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::facts::FactRecord;

/// Evaluate one condition against a fact record.
pub fn evaluate(condition: &Condition, facts: &FactRecord) -> bool {
    let field_value = facts.get(&condition.field);

    match condition.operator {
        ConditionOperator::Exists => field_value.is_some(),
        ConditionOperator::NotExists => field_value.is_none(),
        _ => {
            let Some(actual) = field_value else {
                return false;
            };
            apply(condition.operator, actual, &condition.value)
        }
    }
}

fn apply(operator: ConditionOperator, actual: &JsonValue, expected: &JsonValue) -> bool {
    match operator {
        ConditionOperator::Equals => values_equal(actual, expected),
        ConditionOperator::NotEquals => !values_equal(actual, expected),

        ConditionOperator::Contains => {
            string_pair(actual, expected).is_some_and(|(a, e)| a.contains(e))
        }
        ConditionOperator::NotContains => {
            string_pair(actual, expected).is_some_and(|(a, e)| !a.contains(e))
        }
        ConditionOperator::StartsWith => {
            string_pair(actual, expected).is_some_and(|(a, e)| a.starts_with(e))
        }
        ConditionOperator::EndsWith => {
            string_pair(actual, expected).is_some_and(|(a, e)| a.ends_with(e))
        }

        ConditionOperator::Matches => string_pair(actual, expected)
            .and_then(|(a, e)| Regex::new(e).ok().map(|re| re.is_match(a)))
            .unwrap_or(false),

        ConditionOperator::GreaterThan => numeric_pair(actual, expected).is_some_and(|(a, e)| a > e),
        ConditionOperator::LessThan => numeric_pair(actual, expected).is_some_and(|(a, e)| a < e),
        ConditionOperator::GreaterEqual => {
            numeric_pair(actual, expected).is_some_and(|(a, e)| a >= e)
        }
        ConditionOperator::LessEqual => numeric_pair(actual, expected).is_some_and(|(a, e)| a <= e),

        ConditionOperator::In => expected
            .as_array()
            .is_some_and(|list| list.iter().any(|item| values_equal(actual, item))),
        ConditionOperator::NotIn => expected
            .as_array()
            .is_some_and(|list| !list.iter().any(|item| values_equal(actual, item))),

        // Handled before type dispatch.
        ConditionOperator::Exists | ConditionOperator::NotExists => false,
    }
}

/// Strict equality, except that JSON integer/float representations of the
/// same number compare equal (`730` vs `730.0`).
fn values_equal(a: &JsonValue, b: &JsonValue) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

fn string_pair<'a>(a: &'a JsonValue, b: &'a JsonValue) -> Option<(&'a str, &'a str)> {
    Some((a.as_str()?, b.as_str()?))
}

fn numeric_pair(a: &JsonValue, b: &JsonValue) -> Option<(f64, f64)> {
    if !a.is_number() || !b.is_number() {
        return None;
    }
    Some((a.as_f64()?, b.as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{condition, facts_with};
    use serde_json::json;

    #[test]
    fn equals_matching_non_matching_and_undefined() {
        let facts = facts_with(&[("ecosystem", json!("npm"))]);

        assert!(evaluate(
            &condition("ecosystem", ConditionOperator::Equals, json!("npm")),
            &facts
        ));
        assert!(!evaluate(
            &condition("ecosystem", ConditionOperator::Equals, json!("cargo")),
            &facts
        ));
        assert!(!evaluate(
            &condition("license", ConditionOperator::Equals, json!("MIT")),
            &facts
        ));
    }

    #[test]
    fn equals_bridges_integer_and_float_representations() {
        let facts = facts_with(&[("days_since_last_update", json!(730))]);
        assert!(evaluate(
            &condition(
                "days_since_last_update",
                ConditionOperator::Equals,
                json!(730.0)
            ),
            &facts
        ));
    }

    #[test]
    fn string_operators_reject_non_strings() {
        let facts = facts_with(&[
            ("name", json!("lodash")),
            ("vulnerability.count", json!(3)),
        ]);

        assert!(evaluate(
            &condition("name", ConditionOperator::Contains, json!("dash")),
            &facts
        ));
        assert!(evaluate(
            &condition("name", ConditionOperator::StartsWith, json!("lo")),
            &facts
        ));
        assert!(evaluate(
            &condition("name", ConditionOperator::EndsWith, json!("ash")),
            &facts
        ));
        // not a string -> false, not an error
        assert!(!evaluate(
            &condition("vulnerability.count", ConditionOperator::Contains, json!("3")),
            &facts
        ));
        assert!(!evaluate(
            &condition("vulnerability.count", ConditionOperator::NotContains, json!("3")),
            &facts
        ));
    }

    #[test]
    fn matches_uses_regex_and_tolerates_bad_patterns() {
        let facts = facts_with(&[("version", json!("4.17.20"))]);
        assert!(evaluate(
            &condition("version", ConditionOperator::Matches, json!(r"^4\.")),
            &facts
        ));
        assert!(!evaluate(
            &condition("version", ConditionOperator::Matches, json!(r"^5\.")),
            &facts
        ));
        assert!(!evaluate(
            &condition("version", ConditionOperator::Matches, json!("[unclosed")),
            &facts
        ));
    }

    #[test]
    fn greater_than_matching_non_matching_and_undefined() {
        let facts = facts_with(&[("days_since_last_update", json!(800))]);

        assert!(evaluate(
            &condition(
                "days_since_last_update",
                ConditionOperator::GreaterThan,
                json!(730)
            ),
            &facts
        ));
        assert!(!evaluate(
            &condition(
                "days_since_last_update",
                ConditionOperator::GreaterThan,
                json!(900)
            ),
            &facts
        ));
        assert!(!evaluate(
            &condition("vulnerability.cvss_score", ConditionOperator::GreaterThan, json!(7)),
            &facts
        ));
        // numeric operator against a string operand -> false
        assert!(!evaluate(
            &condition(
                "days_since_last_update",
                ConditionOperator::GreaterThan,
                json!("730")
            ),
            &facts
        ));
    }

    #[test]
    fn ordering_operators_honor_boundaries() {
        let facts = facts_with(&[("vulnerability.cvss_score", json!(7.5))]);

        assert!(evaluate(
            &condition("vulnerability.cvss_score", ConditionOperator::GreaterEqual, json!(7.5)),
            &facts
        ));
        assert!(evaluate(
            &condition("vulnerability.cvss_score", ConditionOperator::LessEqual, json!(7.5)),
            &facts
        ));
        assert!(!evaluate(
            &condition("vulnerability.cvss_score", ConditionOperator::LessThan, json!(7.5)),
            &facts
        ));
    }

    #[test]
    fn in_matching_non_matching_and_undefined() {
        let facts = facts_with(&[("license", json!("GPL-3.0"))]);

        assert!(evaluate(
            &condition(
                "license",
                ConditionOperator::In,
                json!(["GPL-3.0", "AGPL-3.0"])
            ),
            &facts
        ));
        assert!(!evaluate(
            &condition("license", ConditionOperator::In, json!(["MIT", "Apache-2.0"])),
            &facts
        ));
        assert!(!evaluate(
            &condition("ecosystem", ConditionOperator::In, json!(["npm"])),
            &facts
        ));
        // non-array operand -> false for both membership operators
        assert!(!evaluate(
            &condition("license", ConditionOperator::In, json!("GPL-3.0")),
            &facts
        ));
        assert!(!evaluate(
            &condition("license", ConditionOperator::NotIn, json!("GPL-3.0")),
            &facts
        ));
    }

    #[test]
    fn not_in_is_membership_negation() {
        let facts = facts_with(&[("license", json!("MIT"))]);
        assert!(evaluate(
            &condition("license", ConditionOperator::NotIn, json!(["GPL-3.0"])),
            &facts
        ));
        assert!(!evaluate(
            &condition("license", ConditionOperator::NotIn, json!(["MIT"])),
            &facts
        ));
    }

    #[test]
    fn exists_matching_non_matching() {
        let facts = facts_with(&[("license", json!("MIT")), ("noise", JsonValue::Null)]);

        assert!(evaluate(
            &condition("license", ConditionOperator::Exists, JsonValue::Null),
            &facts
        ));
        assert!(!evaluate(
            &condition("days_since_last_update", ConditionOperator::Exists, JsonValue::Null),
            &facts
        ));
        // explicit null counts as undefined
        assert!(evaluate(
            &condition("noise", ConditionOperator::NotExists, JsonValue::Null),
            &facts
        ));
        assert!(!evaluate(
            &condition("license", ConditionOperator::NotExists, JsonValue::Null),
            &facts
        ));
    }
}
