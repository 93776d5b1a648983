//! Stable DTOs and IDs used across the depsentry workspace.
//!
//! This crate is intentionally boring:
//! - data types for policies, dependencies, violations, and results
//! - stable string IDs for events and templates
//! - the typed engine-event set
//! - the emitted report envelope

#![forbid(unsafe_code)]

pub mod dependency;
pub mod event;
pub mod ids;
pub mod policy;
pub mod report;
pub mod result;
pub mod violation;

pub use dependency::{Dependency, DependencyKind, EvaluationContext, UsageScope, Vulnerability};
pub use event::EngineEvent;
pub use policy::{
    Action, ActionConfig, ActionType, AutoFixStrategy, ChangeLogEntry, Condition,
    ConditionOperator, EnforcementMode, ExceptionStatus, IssueTrackerConfig, LogLevel,
    LogicalOperator, Policy, PolicyException, PolicyMetadata, PolicyScope, Rule, RuleMetadata,
    RuleType, Severity,
};
pub use report::{ReportEnvelope, ToolMeta, Verdict, SCHEMA_REPORT_V1};
pub use result::{
    EnforcementResult, EnforcementSummary, EnforcementTotals, EvaluationResult, EvaluationStatus,
    SeverityBreakdown,
};
pub use violation::{
    ActionStatus, Evidence, EvidenceType, ExecutedAction, Violation, ViolationContext,
    ViolationDetails, ViolationStatus,
};
