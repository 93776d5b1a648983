//! Bounded per-run history of enforcement outcomes.

use depsentry_types::{EnforcementSummary, EnforcementTotals};
use std::collections::VecDeque;
use std::sync::RwLock;
use time::OffsetDateTime;

const DEFAULT_RETENTION: usize = 100;

/// Compact record of one enforcement run. Full evaluation payloads are not
/// retained; the report envelope is the durable artifact for those.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRecord {
    pub tenant_id: String,
    pub totals: EnforcementTotals,
    pub summary: EnforcementSummary,
    pub finished_at: OffsetDateTime,
    pub duration_ms: u64,
}

/// Keeps the most recent run records, oldest evicted first.
#[derive(Debug)]
pub struct EvaluationHistory {
    retention: usize,
    runs: RwLock<VecDeque<RunRecord>>,
}

impl Default for EvaluationHistory {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl EvaluationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            runs: RwLock::new(VecDeque::new()),
        }
    }

    pub fn record(&self, result: &depsentry_types::EnforcementResult) {
        let record = RunRecord {
            tenant_id: result.tenant_id.clone(),
            totals: result.totals,
            summary: result.summary.clone(),
            finished_at: result.finished_at,
            duration_ms: result.duration_ms,
        };
        if let Ok(mut runs) = self.runs.write() {
            if runs.len() == self.retention {
                runs.pop_front();
            }
            runs.push_back(record);
        }
    }

    /// Records for one tenant, most recent last.
    pub fn for_tenant(&self, tenant_id: &str) -> Vec<RunRecord> {
        self.runs
            .read()
            .map(|runs| {
                runs.iter()
                    .filter(|r| r.tenant_id == tenant_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn latest(&self, tenant_id: &str) -> Option<RunRecord> {
        self.runs
            .read()
            .ok()?
            .iter()
            .rev()
            .find(|r| r.tenant_id == tenant_id)
            .cloned()
    }
}
