//! Batch enforcement: drives per-dependency evaluation, executes actions
//! for violations, and aggregates the enforcement result.

use depsentry_types::{
    Dependency, EnforcementMode, EnforcementResult, EnforcementSummary, EnforcementTotals,
    EngineEvent, EvaluationContext, EvaluationResult, EvaluationStatus, ExecutedAction, Policy,
    Rule,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

use crate::action::ActionExecutor;
use crate::dependency::DependencyEvaluator;
use crate::events::EventSink;
use crate::rule::FoldMode;

#[derive(Clone, Copy, Debug, Default)]
pub struct EnforcementOptions {
    /// Evaluate dependencies on the rayon pool instead of sequentially.
    /// Dependency evaluations share no mutable state; per-worker results
    /// are merged post-hoc.
    pub parallel: bool,
    pub fold_mode: FoldMode,
    /// Batch deadline. Dependencies not started before it elapses are
    /// recorded as skipped instead of corrupting partial results.
    pub deadline: Option<Duration>,
}

pub struct EnforcementOrchestrator<'a> {
    sink: &'a dyn EventSink,
    options: EnforcementOptions,
}

impl<'a> EnforcementOrchestrator<'a> {
    pub fn new(sink: &'a dyn EventSink) -> Self {
        Self::with_options(sink, EnforcementOptions::default())
    }

    pub fn with_options(sink: &'a dyn EventSink, options: EnforcementOptions) -> Self {
        Self { sink, options }
    }

    /// Evaluate every dependency against the tenant's active policies.
    ///
    /// Per-dependency failures are isolated: a panicking evaluation is
    /// recorded as skipped and surfaced as an error event, and the batch
    /// continues. The policy set is snapshotted for the duration of the
    /// call; concurrent edits to the source list are invisible mid-run.
    pub fn evaluate_policies(
        &self,
        dependencies: &[Dependency],
        policies: &[Policy],
        tenant_id: &str,
        context: &EvaluationContext,
    ) -> EnforcementResult {
        let started_at = OffsetDateTime::now_utc();
        let started = Instant::now();

        let snapshot = snapshot_policies(policies, tenant_id);

        self.sink.publish(EngineEvent::PolicyEvaluationStarted {
            tenant_id: tenant_id.to_string(),
            total_dependencies: dependencies.len() as u32,
        });
        tracing::info!(
            tenant_id,
            dependencies = dependencies.len(),
            policies = snapshot.len(),
            "enforcement batch started"
        );

        let evaluator =
            DependencyEvaluator::new(&snapshot, context, self.options.fold_mode, started_at);
        let deadline = self.options.deadline;

        let evaluate_one = |dep: &Dependency| -> EvaluationResult {
            if deadline.is_some_and(|d| started.elapsed() >= d) {
                return skipped_result(dep, "batch deadline exceeded");
            }
            catch_evaluation(dep, || evaluator.evaluate(dep))
        };

        let evaluations: Vec<EvaluationResult> = if self.options.parallel {
            dependencies.par_iter().map(evaluate_one).collect()
        } else {
            dependencies.iter().map(evaluate_one).collect()
        };

        for result in &evaluations {
            if let Some(error) = &result.error {
                self.sink.publish(EngineEvent::DependencyEvaluationError {
                    dependency: result.dependency.clone(),
                    error: error.clone(),
                });
            }
            for warning in &result.warnings {
                self.sink.publish(EngineEvent::DependencyWarning {
                    violation_id: warning.id.clone(),
                    dependency: warning.dependency.name.clone(),
                    policy_id: warning.policy_id.clone(),
                    rule_id: warning.rule_id.clone(),
                    message: warning.message.clone(),
                });
            }
        }

        // Action execution runs for violations only, never for warnings.
        let executor = ActionExecutor::new(self.sink);
        let mut executed_actions: Vec<ExecutedAction> = Vec::new();
        for result in &evaluations {
            for violation in &result.violations {
                let Some(rule) = find_rule(&snapshot, &violation.policy_id, &violation.rule_id)
                else {
                    continue;
                };
                for action in &rule.actions {
                    executed_actions.push(executor.run(violation, action, started_at));
                }
            }
        }

        let totals = compute_totals(dependencies.len(), &evaluations);
        let summary = compute_summary(&snapshot, &evaluations, &executed_actions);

        self.sink.publish(EngineEvent::PolicyEvaluationCompleted {
            tenant_id: tenant_id.to_string(),
            violations_detected: summary.violations_detected,
            blocked_dependencies: summary.blocked_dependencies,
        });

        let finished_at = OffsetDateTime::now_utc();
        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            tenant_id,
            violations = summary.violations_detected,
            blocked = summary.blocked_dependencies,
            skipped = totals.skipped_dependencies,
            duration_ms,
            "enforcement batch completed"
        );

        EnforcementResult {
            tenant_id: tenant_id.to_string(),
            totals,
            evaluations,
            executed_actions,
            summary,
            started_at,
            finished_at,
            duration_ms,
        }
    }
}

/// Immutable per-run policy snapshot: the tenant's enabled, non-disabled
/// policies, highest priority first (reporting order only).
fn snapshot_policies(policies: &[Policy], tenant_id: &str) -> Arc<[Policy]> {
    let mut active: Vec<Policy> = policies
        .iter()
        .filter(|p| {
            p.enabled && p.tenant_id == tenant_id && p.enforcement_mode != EnforcementMode::Disabled
        })
        .cloned()
        .collect();
    active.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
    active.into()
}

fn catch_evaluation<F>(dep: &Dependency, evaluate: F) -> EvaluationResult
where
    F: FnOnce() -> EvaluationResult,
{
    match panic::catch_unwind(AssertUnwindSafe(evaluate)) {
        Ok(result) => result,
        Err(payload) => {
            let error = panic_message(&payload);
            tracing::error!(dependency = %dep.name, %error, "dependency evaluation failed");
            skipped_result(dep, &error)
        }
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during dependency evaluation".to_string()
    }
}

fn skipped_result(dep: &Dependency, error: &str) -> EvaluationResult {
    EvaluationResult {
        dependency: dep.name.clone(),
        version: dep.version.clone(),
        status: EvaluationStatus::Skipped,
        violations: Vec::new(),
        warnings: Vec::new(),
        exceptions: Vec::new(),
        rules_evaluated: 0,
        rules_triggered: 0,
        duration_ms: 0,
        error: Some(error.to_string()),
    }
}

fn find_rule<'p>(policies: &'p [Policy], policy_id: &str, rule_id: &str) -> Option<&'p Rule> {
    policies
        .iter()
        .find(|p| p.id == policy_id)?
        .rules
        .iter()
        .find(|r| r.id == rule_id)
}

fn compute_totals(total: usize, evaluations: &[EvaluationResult]) -> EnforcementTotals {
    let count =
        |status| evaluations.iter().filter(|e| e.status == status).count() as u32;

    let skipped = count(EvaluationStatus::Skipped);
    // Exception-only dependencies land in the compliant bucket.
    let compliant = count(EvaluationStatus::Compliant) + count(EvaluationStatus::Exception);

    EnforcementTotals {
        total_dependencies: total as u32,
        evaluated_dependencies: total as u32 - skipped,
        skipped_dependencies: skipped,
        compliant_dependencies: compliant,
        violating_dependencies: count(EvaluationStatus::Violation),
        warning_dependencies: count(EvaluationStatus::Warning),
    }
}

fn compute_summary(
    policies: &[Policy],
    evaluations: &[EvaluationResult],
    executed_actions: &[ExecutedAction],
) -> EnforcementSummary {
    let mut summary = EnforcementSummary {
        policies_evaluated: policies.len() as u32,
        actions_executed: executed_actions.len() as u32,
        ..EnforcementSummary::default()
    };
    let mut policy_breakdown: BTreeMap<String, u32> = BTreeMap::new();

    for result in evaluations {
        summary.rules_evaluated += result.rules_evaluated;
        summary.violations_detected += result.violations.len() as u32;
        summary.warnings_detected += result.warnings.len() as u32;
        if result.status == EvaluationStatus::Violation {
            summary.blocked_dependencies += 1;
        }
        for violation in result.violations.iter().chain(result.warnings.iter()) {
            summary.severity_breakdown.bump(violation.severity);
            *policy_breakdown.entry(violation.policy_id.clone()).or_default() += 1;
        }
    }

    summary.policy_breakdown = policy_breakdown;
    summary
}
