use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

use crate::dependency::Dependency;
use crate::policy::{ActionType, Condition, RuleType, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Configuration,
}

/// One evidence entry per triggered condition: what was compared, against
/// what, and what the dependency actually carried.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub expected: JsonValue,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub actual: JsonValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViolationDetails {
    pub rule_name: String,
    pub triggered_conditions: Vec<Condition>,
    /// Fact-record values observed during evaluation, keyed by field path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actual_values: BTreeMap<String, JsonValue>,
    pub evidence: Vec<Evidence>,
    pub impact: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViolationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub ecosystem: String,
    pub package_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStatus {
    Open,
    Acknowledged,
    Resolved,
    Suppressed,
    FalsePositive,
}

/// A recorded, evidenced instance of a rule firing. Immutable once built;
/// status transitions happen out-of-band via violation resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub id: String,
    pub tenant_id: String,
    pub policy_id: String,
    pub rule_id: String,
    /// Full snapshot of the dependency as evaluated.
    pub dependency: Dependency,
    pub violation_type: RuleType,
    pub severity: Severity,
    pub message: String,
    pub details: ViolationDetails,
    pub context: ViolationContext,
    pub status: ViolationStatus,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub detected_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub resolved_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failed,
    Skipped,
}

/// Outcome of one configured action against one violation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutedAction {
    pub id: String,
    pub violation_id: String,
    pub dependency: String,
    pub policy_id: String,
    pub rule_id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub executed_at: OffsetDateTime,
}
