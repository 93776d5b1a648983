use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

use crate::policy::{PolicyException, Severity};
use crate::violation::{ExecutedAction, Violation};

/// Per-dependency outcome, in priority order:
/// `Violation` > `Warning` > `Exception` > `Compliant`; `Skipped` means the
/// evaluation itself failed or was cut off by the batch deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Compliant,
    Violation,
    Warning,
    Exception,
    Skipped,
}

/// Result of evaluating one dependency against all in-scope policies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationResult {
    pub dependency: String,
    pub version: String,
    pub status: EvaluationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<PolicyException>,
    pub rules_evaluated: u32,
    pub rules_triggered: u32,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnforcementTotals {
    pub total_dependencies: u32,
    pub evaluated_dependencies: u32,
    pub skipped_dependencies: u32,
    pub compliant_dependencies: u32,
    pub violating_dependencies: u32,
    pub warning_dependencies: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeverityBreakdown {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl SeverityBreakdown {
    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnforcementSummary {
    pub policies_evaluated: u32,
    pub rules_evaluated: u32,
    pub violations_detected: u32,
    pub warnings_detected: u32,
    pub actions_executed: u32,
    /// Dependencies with at least one violation carrying an enabled block action.
    pub blocked_dependencies: u32,
    pub severity_breakdown: SeverityBreakdown,
    /// Violation + warning occurrences per policy id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub policy_breakdown: BTreeMap<String, u32>,
}

/// The full outcome of one enforcement batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnforcementResult {
    pub tenant_id: String,
    pub totals: EnforcementTotals,
    pub evaluations: Vec<EvaluationResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executed_actions: Vec<ExecutedAction>,
    pub summary: EnforcementSummary,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub duration_ms: u64,
}
