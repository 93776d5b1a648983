//! Violation bookkeeping across evaluation runs.

use depsentry_types::{Violation, ViolationStatus};
use std::collections::BTreeMap;
use std::sync::RwLock;
use time::OffsetDateTime;

use crate::error::PolicyError;

/// Records violations per run and supports out-of-band status transitions.
#[derive(Debug, Default)]
pub struct ViolationLog {
    inner: RwLock<BTreeMap<String, Violation>>,
}

impl ViolationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the violations of one enforcement run. Re-detections of the
    /// same (dependency, rule) identity overwrite the previous record.
    pub fn record<I: IntoIterator<Item = Violation>>(&self, violations: I) {
        if let Ok(mut map) = self.inner.write() {
            for violation in violations {
                map.insert(violation.id.clone(), violation);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Violation> {
        self.inner.read().ok()?.get(id).cloned()
    }

    /// Open violations for a tenant, in stable id order.
    pub fn open(&self, tenant_id: &str) -> Vec<Violation> {
        self.inner
            .read()
            .map(|map| {
                map.values()
                    .filter(|v| v.tenant_id == tenant_id && v.status == ViolationStatus::Open)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Transition a violation's status. Terminal statuses stamp
    /// `resolved_at`.
    pub fn resolve(
        &self,
        id: &str,
        status: ViolationStatus,
        note: Option<String>,
    ) -> Result<Violation, PolicyError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| PolicyError::ViolationNotFound {
                violation_id: id.to_string(),
            })?;
        let violation = map.get_mut(id).ok_or_else(|| PolicyError::ViolationNotFound {
            violation_id: id.to_string(),
        })?;

        violation.status = status;
        violation.resolution_note = note;
        if matches!(
            status,
            ViolationStatus::Resolved | ViolationStatus::Suppressed | ViolationStatus::FalsePositive
        ) {
            violation.resolved_at = Some(OffsetDateTime::now_utc());
        }
        Ok(violation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::minimal_policy;
    use depsentry_engine::build_violation;
    use depsentry_engine::rule::RuleOutcome;
    use depsentry_types::{
        Dependency, DependencyKind, EvaluationContext, UsageScope,
    };
    use time::macros::datetime;

    fn sample_violation() -> Violation {
        let policy = minimal_policy("p1");
        let dep = Dependency {
            name: "lodash".to_string(),
            version: "4.17.20".to_string(),
            kind: DependencyKind::Direct,
            usage_scope: UsageScope::Production,
            ecosystem: "npm".to_string(),
            package_file: "package.json".to_string(),
            licenses: vec!["MIT".to_string()],
            last_update: None,
            vulnerabilities: Vec::new(),
        };
        build_violation(
            &policy,
            &policy.rules[0],
            &dep,
            &RuleOutcome::default(),
            &EvaluationContext::default(),
            datetime!(2026-01-01 00:00 UTC),
        )
    }

    #[test]
    fn record_and_resolve_lifecycle() {
        let log = ViolationLog::new();
        let violation = sample_violation();
        let id = violation.id.clone();
        log.record([violation]);

        assert_eq!(log.open("tenant-1").len(), 1);
        assert!(log.open("tenant-2").is_empty());

        let resolved = log
            .resolve(&id, ViolationStatus::Resolved, Some("upgraded".to_string()))
            .expect("resolve");
        assert_eq!(resolved.status, ViolationStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
        assert_eq!(resolved.resolution_note.as_deref(), Some("upgraded"));
        assert!(log.open("tenant-1").is_empty());
    }

    #[test]
    fn acknowledging_does_not_stamp_resolution() {
        let log = ViolationLog::new();
        let violation = sample_violation();
        let id = violation.id.clone();
        log.record([violation]);

        let acked = log
            .resolve(&id, ViolationStatus::Acknowledged, None)
            .expect("resolve");
        assert!(acked.resolved_at.is_none());
    }

    #[test]
    fn resolving_unknown_violation_fails() {
        let log = ViolationLog::new();
        assert!(matches!(
            log.resolve("ghost", ViolationStatus::Resolved, None),
            Err(PolicyError::ViolationNotFound { .. })
        ));
    }
}
