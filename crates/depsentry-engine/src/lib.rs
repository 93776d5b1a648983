//! Pure policy evaluation (no IO).
//!
//! Input: an inventoried dependency set and an immutable policy snapshot,
//! both constructed elsewhere.
//! Output: per-dependency evaluations, executed actions, and a batch
//! enforcement result. Side effects leave the engine only as typed
//! `EngineEvent`s through an [`events::EventSink`].

#![forbid(unsafe_code)]

pub mod action;
pub mod condition;
pub mod events;
pub mod facts;
pub mod rule;
pub mod scope;

mod dependency;
mod exception;
mod fingerprint;
mod orchestrator;
mod violation;

#[cfg(test)]
pub(crate) mod test_support;

pub use dependency::DependencyEvaluator;
pub use exception::find_active_exception;
pub use orchestrator::{EnforcementOptions, EnforcementOrchestrator};
pub use rule::FoldMode;
pub use violation::build_violation;
