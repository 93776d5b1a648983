//! Per-dependency evaluation pipeline: scope filter, exception check, rule
//! evaluation, violation/warning classification.

use depsentry_types::{
    ActionType, Dependency, EnforcementMode, EvaluationContext, EvaluationResult,
    EvaluationStatus, Policy, PolicyException, Rule, RuleType, Violation,
};
use std::time::Instant;
use time::OffsetDateTime;

use crate::facts::FactRecord;
use crate::rule::{self, FoldMode};
use crate::scope;
use crate::violation::build_violation;
use crate::exception::find_active_exception;

pub struct DependencyEvaluator<'a> {
    policies: &'a [Policy],
    context: &'a EvaluationContext,
    fold_mode: FoldMode,
    now: OffsetDateTime,
}

impl<'a> DependencyEvaluator<'a> {
    pub fn new(
        policies: &'a [Policy],
        context: &'a EvaluationContext,
        fold_mode: FoldMode,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            policies,
            context,
            fold_mode,
            now,
        }
    }

    /// Evaluate one dependency against every applicable policy.
    ///
    /// A triggered rule becomes a violation when the policy is enforcing and
    /// the rule carries an enabled block action; otherwise it becomes a
    /// warning. An active exception suppresses its rule entirely.
    pub fn evaluate(&self, dependency: &Dependency) -> EvaluationResult {
        let started = Instant::now();

        let mut violations: Vec<Violation> = Vec::new();
        let mut warnings: Vec<Violation> = Vec::new();
        let mut exceptions: Vec<PolicyException> = Vec::new();
        let mut rules_evaluated = 0u32;
        let mut rules_triggered = 0u32;

        // The base record serves every rule type; the vulnerability record
        // additionally carries the matched-vulnerability fields.
        let base_facts =
            FactRecord::build(dependency, self.context, RuleType::Configuration, self.now);
        let vuln_facts =
            FactRecord::build(dependency, self.context, RuleType::Vulnerability, self.now);

        for policy in self.policies {
            if !policy.enabled || policy.enforcement_mode == EnforcementMode::Disabled {
                continue;
            }
            if !scope::in_scope(dependency, &policy.scope, self.context) {
                continue;
            }

            for rule in policy.rules.iter().filter(|r| r.enabled) {
                if let Some(exception) =
                    find_active_exception(policy, rule, dependency, self.now)
                {
                    exceptions.push(exception.clone());
                    continue;
                }

                rules_evaluated += 1;
                let facts = if rule.rule_type == RuleType::Vulnerability {
                    &vuln_facts
                } else {
                    &base_facts
                };
                let outcome = rule::evaluate(rule, facts, self.fold_mode);
                if !outcome.triggered {
                    continue;
                }

                rules_triggered += 1;
                let violation =
                    build_violation(policy, rule, dependency, &outcome, self.context, self.now);
                if is_blocking(policy, rule) {
                    violations.push(violation);
                } else {
                    warnings.push(violation);
                }
            }
        }

        let status = if !violations.is_empty() {
            EvaluationStatus::Violation
        } else if !warnings.is_empty() {
            EvaluationStatus::Warning
        } else if !exceptions.is_empty() {
            EvaluationStatus::Exception
        } else {
            EvaluationStatus::Compliant
        };

        EvaluationResult {
            dependency: dependency.name.clone(),
            version: dependency.version.clone(),
            status,
            violations,
            warnings,
            exceptions,
            rules_evaluated,
            rules_triggered,
            duration_ms: started.elapsed().as_millis() as u64,
            error: None,
        }
    }
}

/// A rule blocks only under an enforcing policy; permissive policies are
/// advisory and downgrade every trigger to a warning.
fn is_blocking(policy: &Policy, rule: &Rule) -> bool {
    policy.enforcement_mode == EnforcementMode::Enforcing
        && rule
            .actions
            .iter()
            .any(|a| a.enabled && a.action_type == ActionType::Block)
}
