//! Mutual exclusion for scheduled enforcement runs.
//!
//! A schedule that fires while its previous run is still in flight must not
//! start a second run. The guard hands out RAII permits keyed by schedule
//! id; dropping the permit releases the slot even on a panicking unwind.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone)]
pub struct RunGuard {
    active: Arc<Mutex<BTreeSet<String>>>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for a schedule. Returns `None` while a previous run
    /// still holds it.
    pub fn try_acquire(&self, schedule_id: &str) -> Option<RunPermit> {
        let mut active = self.active.lock().ok()?;
        if !active.insert(schedule_id.to_string()) {
            return None;
        }
        Some(RunPermit {
            schedule_id: schedule_id.to_string(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_running(&self, schedule_id: &str) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(schedule_id))
            .unwrap_or(false)
    }
}

/// Held for the duration of one run; releases its slot on drop.
#[derive(Debug)]
pub struct RunPermit {
    schedule_id: String,
    active: Arc<Mutex<BTreeSet<String>>>,
}

impl RunPermit {
    pub fn schedule_id(&self) -> &str {
        &self.schedule_id
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.schedule_id);
        }
    }
}
