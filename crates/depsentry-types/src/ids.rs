//! Stable identifiers for events and built-in policy templates.
//!
//! Event names are snake_case and match the serde tag on `EngineEvent`.

// Engine events
pub const EVENT_EVALUATION_STARTED: &str = "policy_evaluation_started";
pub const EVENT_EVALUATION_COMPLETED: &str = "policy_evaluation_completed";
pub const EVENT_EVALUATION_FAILED: &str = "policy_evaluation_failed";
pub const EVENT_DEPENDENCY_ERROR: &str = "dependency_evaluation_error";
pub const EVENT_DEPENDENCY_BLOCKED: &str = "dependency_blocked";
pub const EVENT_DEPENDENCY_WARNING: &str = "dependency_warning";
pub const EVENT_VIOLATION_NOTIFICATION: &str = "policy_violation_notification";
pub const EVENT_AUTO_FIX_TRIGGERED: &str = "auto_fix_triggered";
pub const EVENT_ISSUE_CREATED: &str = "issue_created";
pub const EVENT_VIOLATION_ESCALATED: &str = "violation_escalated";

// Built-in policy templates
pub const TEMPLATE_CRITICAL_VULNERABILITY_BLOCK: &str = "critical_vulnerability_block";
pub const TEMPLATE_LICENSE_ALLOWLIST: &str = "license_allowlist";
pub const TEMPLATE_STALE_MAINTENANCE_WARN: &str = "stale_maintenance_warn";
