//! Rule evaluation: combining condition results into a trigger decision.

use depsentry_types::{Condition, LogicalOperator, Rule};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::condition;
use crate::facts::FactRecord;

/// How a rule's AND/OR chain is combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FoldMode {
    /// Left-to-right sequential fold with no operator precedence: condition
    /// 0 seeds the accumulator, and condition *i*'s `logical` operator
    /// decides how condition *i+1* combines into it. Mixed AND/OR chains
    /// are therefore order-dependent. This reproduces the reference
    /// behavior exactly and is the default.
    #[default]
    Sequential,
    /// Stricter opt-in semantics: the chain is split into AND-groups at
    /// each `OR` boundary, and the rule triggers when any group is fully
    /// satisfied (conventional disjunctive normal form without nesting).
    Grouped,
}

/// Trigger decision plus the evidence gathered while deciding it.
#[derive(Clone, Debug, Default)]
pub struct RuleOutcome {
    pub triggered: bool,
    /// Conditions that individually evaluated true.
    pub triggered_conditions: Vec<Condition>,
    /// Observed value per referenced field, recorded regardless of outcome.
    pub actual_values: BTreeMap<String, JsonValue>,
}

/// Evaluate a rule's conditions in declared order against a fact record.
pub fn evaluate(rule: &Rule, facts: &FactRecord, mode: FoldMode) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    let mut results = Vec::with_capacity(rule.conditions.len());

    for cond in &rule.conditions {
        let result = condition::evaluate(cond, facts);
        outcome
            .actual_values
            .insert(cond.field.clone(), facts.actual(&cond.field));
        if result {
            outcome.triggered_conditions.push(cond.clone());
        }
        results.push(result);
    }

    outcome.triggered = match mode {
        FoldMode::Sequential => fold_sequential(&rule.conditions, &results),
        FoldMode::Grouped => fold_grouped(&rule.conditions, &results),
    };
    outcome
}

fn fold_sequential(conditions: &[Condition], results: &[bool]) -> bool {
    let Some(&first) = results.first() else {
        return false;
    };
    let mut acc = first;
    for (i, &result) in results.iter().enumerate().skip(1) {
        // The operator on condition i-1 governs how condition i combines.
        let op = conditions[i - 1].logical.unwrap_or(LogicalOperator::And);
        acc = match op {
            LogicalOperator::And => acc && result,
            LogicalOperator::Or => acc || result,
        };
    }
    acc
}

fn fold_grouped(conditions: &[Condition], results: &[bool]) -> bool {
    if results.is_empty() {
        return false;
    }
    let mut group_satisfied = true;
    for (i, &result) in results.iter().enumerate() {
        group_satisfied = group_satisfied && result;
        let ends_group = conditions[i].logical == Some(LogicalOperator::Or);
        let last = i == results.len() - 1;
        if ends_group || last {
            if group_satisfied {
                return true;
            }
            group_satisfied = true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactRecord;
    use crate::test_support::{chain_rule, condition_chain};
    use depsentry_types::ConditionOperator;
    use serde_json::json;

    fn facts() -> FactRecord {
        FactRecord::from_pairs(&[
            ("ecosystem", json!("npm")),
            ("license", json!("MIT")),
            ("days_since_last_update", json!(800)),
        ])
    }

    #[test]
    fn single_condition_seeds_the_accumulator() {
        let rule = chain_rule(condition_chain(&[(
            "ecosystem",
            ConditionOperator::Equals,
            json!("npm"),
            None,
        )]));
        let outcome = evaluate(&rule, &facts(), FoldMode::Sequential);
        assert!(outcome.triggered);
        assert_eq!(outcome.triggered_conditions.len(), 1);
        assert_eq!(outcome.actual_values["ecosystem"], json!("npm"));
    }

    #[test]
    fn and_chain_requires_all() {
        let rule = chain_rule(condition_chain(&[
            ("ecosystem", ConditionOperator::Equals, json!("npm"), None),
            ("license", ConditionOperator::Equals, json!("GPL-3.0"), None),
        ]));
        let outcome = evaluate(&rule, &facts(), FoldMode::Sequential);
        assert!(!outcome.triggered);
        // Evidence is still recorded for the failed comparison.
        assert_eq!(outcome.actual_values["license"], json!("MIT"));
    }

    #[test]
    fn sequential_fold_is_order_dependent_for_mixed_chains() {
        use depsentry_types::LogicalOperator::Or;

        // (false OR true) AND false -> false
        let rule = chain_rule(condition_chain(&[
            ("license", ConditionOperator::Equals, json!("GPL-3.0"), Some(Or)),
            ("ecosystem", ConditionOperator::Equals, json!("npm"), None),
            ("license", ConditionOperator::Equals, json!("Apache-2.0"), None),
        ]));
        assert!(!evaluate(&rule, &facts(), FoldMode::Sequential).triggered);

        // Same conditions, OR moved last: (false AND true) OR true -> true.
        // Conventional precedence would give the same answer for both
        // orderings; the sequential fold deliberately does not.
        let rule = chain_rule(condition_chain(&[
            ("license", ConditionOperator::Equals, json!("GPL-3.0"), None),
            ("ecosystem", ConditionOperator::Equals, json!("npm"), Some(Or)),
            ("days_since_last_update", ConditionOperator::GreaterThan, json!(730), None),
        ]));
        assert!(evaluate(&rule, &facts(), FoldMode::Sequential).triggered);
    }

    #[test]
    fn grouped_mode_ors_and_groups() {
        use depsentry_types::LogicalOperator::Or;

        // Group 1: license == GPL-3.0 (false). Group 2: ecosystem == npm
        // AND days > 730 (true). Rule triggers in grouped mode.
        let chain = condition_chain(&[
            ("license", ConditionOperator::Equals, json!("GPL-3.0"), Some(Or)),
            ("ecosystem", ConditionOperator::Equals, json!("npm"), None),
            ("days_since_last_update", ConditionOperator::GreaterThan, json!(730), None),
        ]);
        let rule = chain_rule(chain);
        assert!(evaluate(&rule, &facts(), FoldMode::Grouped).triggered);

        // No group fully satisfied -> no trigger.
        let chain = condition_chain(&[
            ("license", ConditionOperator::Equals, json!("GPL-3.0"), Some(Or)),
            ("ecosystem", ConditionOperator::Equals, json!("cargo"), None),
        ]);
        let rule = chain_rule(chain);
        assert!(!evaluate(&rule, &facts(), FoldMode::Grouped).triggered);
    }

    #[test]
    fn empty_condition_list_never_triggers() {
        let rule = chain_rule(Vec::new());
        assert!(!evaluate(&rule, &facts(), FoldMode::Sequential).triggered);
        assert!(!evaluate(&rule, &facts(), FoldMode::Grouped).triggered);
    }
}
