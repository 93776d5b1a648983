//! Enforcement action execution.
//!
//! Actions are signals, not mechanisms: `block` does not stop a build and
//! `auto_fix` does not rewrite a manifest. Each action publishes an event
//! for the collaborator that owns the mechanism. Actions execute
//! independently; one failure is recorded as `Failed` and never aborts
//! sibling actions or the enclosing evaluation.

use depsentry_types::{
    Action, ActionStatus, ActionType, AutoFixStrategy, EngineEvent, ExecutedAction, LogLevel,
    Violation,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::events::EventSink;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("create_issue requires an issue_tracker config")]
    MissingIssueTracker,
}

pub struct ActionExecutor<'a> {
    sink: &'a dyn EventSink,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(sink: &'a dyn EventSink) -> Self {
        Self { sink }
    }

    /// Execute one configured action against a violation.
    pub fn run(&self, violation: &Violation, action: &Action, now: OffsetDateTime) -> ExecutedAction {
        let (status, detail) = if action.enabled {
            match self.dispatch(violation, action) {
                Ok(detail) => (ActionStatus::Success, Some(detail)),
                Err(err) => (ActionStatus::Failed, Some(err.to_string())),
            }
        } else {
            (ActionStatus::Skipped, Some("action disabled".to_string()))
        };

        ExecutedAction {
            id: Uuid::new_v4().to_string(),
            violation_id: violation.id.clone(),
            dependency: violation.dependency.name.clone(),
            policy_id: violation.policy_id.clone(),
            rule_id: violation.rule_id.clone(),
            action_type: action.action_type,
            status,
            detail,
            executed_at: now,
        }
    }

    fn dispatch(&self, violation: &Violation, action: &Action) -> Result<String, ActionError> {
        let config = &action.config;
        match action.action_type {
            ActionType::Block => {
                let message = config
                    .message
                    .clone()
                    .unwrap_or_else(|| violation.message.clone());
                self.sink.publish(EngineEvent::DependencyBlocked {
                    violation_id: violation.id.clone(),
                    dependency: violation.dependency.name.clone(),
                    policy_id: violation.policy_id.clone(),
                    rule_id: violation.rule_id.clone(),
                    message: message.clone(),
                });
                Ok(format!("block signal emitted: {message}"))
            }
            ActionType::Warn => {
                let message = config
                    .message
                    .clone()
                    .unwrap_or_else(|| violation.message.clone());
                self.sink.publish(EngineEvent::DependencyWarning {
                    violation_id: violation.id.clone(),
                    dependency: violation.dependency.name.clone(),
                    policy_id: violation.policy_id.clone(),
                    rule_id: violation.rule_id.clone(),
                    message: message.clone(),
                });
                Ok(format!("warning signal emitted: {message}"))
            }
            ActionType::Log => {
                let level = config.log_level.unwrap_or(LogLevel::Warn);
                log_violation(level, violation);
                Ok(format!("logged at {level:?}").to_lowercase())
            }
            ActionType::Notify => {
                self.sink.publish(EngineEvent::PolicyViolationNotification {
                    violation_id: violation.id.clone(),
                    dependency: violation.dependency.name.clone(),
                    channels: config.channels.clone(),
                    recipients: config.recipients.clone(),
                });
                Ok(format!(
                    "notification requested on {} channel(s)",
                    config.channels.len()
                ))
            }
            ActionType::AutoFix => {
                let strategy = config.strategy.unwrap_or(AutoFixStrategy::Update);
                self.sink.publish(EngineEvent::AutoFixTriggered {
                    violation_id: violation.id.clone(),
                    dependency: violation.dependency.name.clone(),
                    strategy,
                });
                Ok(format!("auto-fix triggered with strategy {strategy:?}").to_lowercase())
            }
            ActionType::CreateIssue => {
                let tracker = config
                    .issue_tracker
                    .as_ref()
                    .ok_or(ActionError::MissingIssueTracker)?;
                self.sink.publish(EngineEvent::IssueCreated {
                    violation_id: violation.id.clone(),
                    dependency: violation.dependency.name.clone(),
                    system: tracker.system.clone(),
                    project: tracker.project.clone(),
                    issue_type: tracker.issue_type.clone(),
                    priority: tracker.priority.clone(),
                });
                Ok(format!(
                    "issue requested in {}/{}",
                    tracker.system, tracker.project
                ))
            }
            ActionType::Escalate => {
                let level = config.escalation_level.unwrap_or(1);
                self.sink.publish(EngineEvent::ViolationEscalated {
                    violation_id: violation.id.clone(),
                    dependency: violation.dependency.name.clone(),
                    level,
                });
                Ok(format!("escalated to level {level}"))
            }
        }
    }
}

fn log_violation(level: LogLevel, violation: &Violation) {
    let dependency = violation.dependency.name.as_str();
    let rule_id = violation.rule_id.as_str();
    let message = violation.message.as_str();
    match level {
        LogLevel::Debug => tracing::debug!(dependency, rule_id, message, "policy violation"),
        LogLevel::Info => tracing::info!(dependency, rule_id, message, "policy violation"),
        LogLevel::Warn => tracing::warn!(dependency, rule_id, message, "policy violation"),
        LogLevel::Error => tracing::error!(dependency, rule_id, message, "policy violation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::test_support::{action_of, sample_violation};
    use depsentry_types::{ids, ActionConfig, IssueTrackerConfig};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-01-01 00:00 UTC);

    #[test]
    fn block_emits_a_block_signal() {
        let sink = MemorySink::new();
        let executor = ActionExecutor::new(&sink);
        let violation = sample_violation();

        let mut action = action_of(ActionType::Block);
        action.config.message = Some("blocked by org policy".to_string());
        let executed = executor.run(&violation, &action, NOW);

        assert_eq!(executed.status, ActionStatus::Success);
        assert_eq!(sink.count_named(ids::EVENT_DEPENDENCY_BLOCKED), 1);
        match &sink.events()[0] {
            EngineEvent::DependencyBlocked { message, dependency, .. } => {
                assert_eq!(message, "blocked by org policy");
                assert_eq!(dependency, &violation.dependency.name);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn create_issue_without_tracker_config_fails_in_isolation() {
        let sink = MemorySink::new();
        let executor = ActionExecutor::new(&sink);
        let violation = sample_violation();

        let failed = executor.run(&violation, &action_of(ActionType::CreateIssue), NOW);
        assert_eq!(failed.status, ActionStatus::Failed);
        assert!(failed.detail.as_deref().unwrap().contains("issue_tracker"));

        // Sibling action still succeeds.
        let ok = executor.run(&violation, &action_of(ActionType::Log), NOW);
        assert_eq!(ok.status, ActionStatus::Success);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn create_issue_with_tracker_publishes_issue_created() {
        let sink = MemorySink::new();
        let executor = ActionExecutor::new(&sink);
        let violation = sample_violation();

        let mut action = action_of(ActionType::CreateIssue);
        action.config = ActionConfig {
            issue_tracker: Some(IssueTrackerConfig {
                system: "jira".to_string(),
                project: "SEC".to_string(),
                issue_type: "Bug".to_string(),
                priority: "High".to_string(),
            }),
            ..ActionConfig::default()
        };

        let executed = executor.run(&violation, &action, NOW);
        assert_eq!(executed.status, ActionStatus::Success);
        assert_eq!(sink.count_named(ids::EVENT_ISSUE_CREATED), 1);
    }

    #[test]
    fn disabled_actions_are_skipped_without_side_effects() {
        let sink = MemorySink::new();
        let executor = ActionExecutor::new(&sink);
        let violation = sample_violation();

        let mut action = action_of(ActionType::Notify);
        action.enabled = false;
        let executed = executor.run(&violation, &action, NOW);

        assert_eq!(executed.status, ActionStatus::Skipped);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn escalate_carries_the_configured_level() {
        let sink = MemorySink::new();
        let executor = ActionExecutor::new(&sink);
        let violation = sample_violation();

        let mut action = action_of(ActionType::Escalate);
        action.config.escalation_level = Some(3);
        executor.run(&violation, &action, NOW);

        match &sink.events()[0] {
            EngineEvent::ViolationEscalated { level, .. } => assert_eq!(*level, 3),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
