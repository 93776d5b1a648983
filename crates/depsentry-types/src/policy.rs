use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use time::OffsetDateTime;

use crate::dependency::{DependencyKind, UsageScope};

/// Severity is ordered: `Critical` outranks `High` outranks `Medium` outranks `Low`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Whether a policy's violations actively block or are advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    Enforcing,
    Permissive,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Vulnerability,
    License,
    Age,
    Maintenance,
    Configuration,
    Custom,
}

/// The closed operator set for conditions.
///
/// Unknown operator names fail at deserialization; a free-form operator
/// string never reaches the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Matches,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    In,
    NotIn,
    Exists,
    NotExists,
}

impl ConditionOperator {
    /// Stable wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::Matches => "matches",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::GreaterEqual => "greater_equal",
            ConditionOperator::LessEqual => "less_equal",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not_in",
            ConditionOperator::Exists => "exists",
            ConditionOperator::NotExists => "not_exists",
        }
    }
}

/// How the *next* condition's result combines with the running result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// One field/operator/value comparison against dependency facts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    /// Dotted fact-record path, e.g. `vulnerability.severity`.
    pub field: String,
    pub operator: ConditionOperator,
    /// Comparison operand; absent for `exists`/`not_exists`.
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub value: JsonValue,
    /// Combines the *following* condition's result into the running fold.
    /// Defaults to `AND` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical: Option<LogicalOperator>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Block,
    Warn,
    Log,
    Notify,
    AutoFix,
    CreateIssue,
    Escalate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AutoFixStrategy {
    Update,
    Replace,
    Configure,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Issue-tracker descriptor required by `create_issue` actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssueTrackerConfig {
    pub system: String,
    pub project: String,
    pub issue_type: String,
    pub priority: String,
}

/// Per-action configuration. Which fields matter depends on the action type;
/// validation enforces the required ones at policy-creation time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AutoFixStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_tracker: Option<IssueTrackerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_level: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub config: ActionConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// A single compliance check: conditions (when it fires) plus actions
/// (what happens when it fires).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub metadata: RuleMetadata,
}

/// Scope filter. An empty set on any dimension means "no restriction on
/// that dimension", never "excludes everything".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyScope {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub environments: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub projects: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub ecosystems: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dependency_kinds: BTreeSet<DependencyKind>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub usage_scopes: BTreeSet<UsageScope>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionStatus {
    Active,
    Expired,
    Revoked,
}

/// A time-bound, approved suppression of one rule for one dependency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyException {
    pub id: String,
    pub rule_id: String,
    /// Dependency name the exception applies to.
    pub dependency: String,
    pub justification: String,
    pub approved_by: String,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub approved_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub status: ExceptionStatus,
}

impl PolicyException {
    /// Valid only while `status == Active` and not yet expired.
    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        self.status == ExceptionStatus::Active && self.expires_at > now
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangeLogEntry {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub author: String,
    pub note: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[schemars(with = "Option<String>")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[schemars(with = "Option<String>")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
    #[schemars(with = "Option<String>")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub next_review_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub change_log: Vec<ChangeLogEntry>,
}

/// A named, versioned collection of rules with a declared scope and
/// enforcement mode. Tenant-scoped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Policy {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Semver string; `update` bumps the patch component.
    pub version: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Higher priority is reported first; it never short-circuits evaluation.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub scope: PolicyScope,
    pub rules: Vec<Rule>,
    pub enforcement_mode: EnforcementMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<PolicyException>,
    #[serde(default)]
    pub metadata: PolicyMetadata,
}

fn default_true() -> bool {
    true
}
