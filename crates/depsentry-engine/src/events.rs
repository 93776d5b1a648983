//! The engine's only side-effect channel.
//!
//! Consumers (CI gate, notifier, ticketing bridge, audit log) implement
//! [`EventSink`]; the engine publishes the closed [`EngineEvent`] set and
//! never calls external services itself.

use depsentry_types::EngineEvent;
use std::sync::Mutex;

pub trait EventSink: Send + Sync {
    fn publish(&self, event: EngineEvent);
}

/// Discards every event. Useful when the caller only wants the result.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: EngineEvent) {}
}

/// Buffers events in memory, for tests and in-process consumers.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<EngineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Forwards events to `tracing`, one structured line per event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: EngineEvent) {
        match &event {
            EngineEvent::PolicyEvaluationFailed { error, .. }
            | EngineEvent::DependencyEvaluationError { error, .. } => {
                tracing::error!(event = event.name(), %error, "engine event");
            }
            EngineEvent::DependencyBlocked { dependency, .. } => {
                tracing::warn!(event = event.name(), %dependency, "engine event");
            }
            _ => {
                tracing::info!(event = event.name(), "engine event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsentry_types::ids;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.publish(EngineEvent::PolicyEvaluationStarted {
            tenant_id: "t1".to_string(),
            total_dependencies: 2,
        });
        sink.publish(EngineEvent::PolicyEvaluationCompleted {
            tenant_id: "t1".to_string(),
            violations_detected: 0,
            blocked_dependencies: 0,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), ids::EVENT_EVALUATION_STARTED);
        assert_eq!(sink.count_named(ids::EVENT_EVALUATION_COMPLETED), 1);
    }
}
