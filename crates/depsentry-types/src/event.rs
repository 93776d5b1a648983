use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::policy::AutoFixStrategy;

/// The closed set of events the engine publishes.
///
/// Downstream consumers (CI gate, notifier, ticketing bridge, audit log)
/// receive these through an `EventSink`; each variant carries enough data to
/// act without re-querying the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    PolicyEvaluationStarted {
        tenant_id: String,
        total_dependencies: u32,
    },
    PolicyEvaluationCompleted {
        tenant_id: String,
        violations_detected: u32,
        blocked_dependencies: u32,
    },
    PolicyEvaluationFailed {
        tenant_id: String,
        error: String,
    },
    DependencyEvaluationError {
        dependency: String,
        error: String,
    },
    DependencyBlocked {
        violation_id: String,
        dependency: String,
        policy_id: String,
        rule_id: String,
        message: String,
    },
    DependencyWarning {
        violation_id: String,
        dependency: String,
        policy_id: String,
        rule_id: String,
        message: String,
    },
    PolicyViolationNotification {
        violation_id: String,
        dependency: String,
        channels: Vec<String>,
        recipients: Vec<String>,
    },
    AutoFixTriggered {
        violation_id: String,
        dependency: String,
        strategy: AutoFixStrategy,
    },
    IssueCreated {
        violation_id: String,
        dependency: String,
        system: String,
        project: String,
        issue_type: String,
        priority: String,
    },
    ViolationEscalated {
        violation_id: String,
        dependency: String,
        level: u8,
    },
}

impl EngineEvent {
    /// Stable wire name for the event, matching the serde tag.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::PolicyEvaluationStarted { .. } => ids::EVENT_EVALUATION_STARTED,
            EngineEvent::PolicyEvaluationCompleted { .. } => ids::EVENT_EVALUATION_COMPLETED,
            EngineEvent::PolicyEvaluationFailed { .. } => ids::EVENT_EVALUATION_FAILED,
            EngineEvent::DependencyEvaluationError { .. } => ids::EVENT_DEPENDENCY_ERROR,
            EngineEvent::DependencyBlocked { .. } => ids::EVENT_DEPENDENCY_BLOCKED,
            EngineEvent::DependencyWarning { .. } => ids::EVENT_DEPENDENCY_WARNING,
            EngineEvent::PolicyViolationNotification { .. } => ids::EVENT_VIOLATION_NOTIFICATION,
            EngineEvent::AutoFixTriggered { .. } => ids::EVENT_AUTO_FIX_TRIGGERED,
            EngineEvent::IssueCreated { .. } => ids::EVENT_ISSUE_CREATED,
            EngineEvent::ViolationEscalated { .. } => ids::EVENT_VIOLATION_ESCALATED,
        }
    }
}
