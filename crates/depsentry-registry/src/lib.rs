//! Policy administration: CRUD over a repository interface, structural
//! validation, template instantiation, violation resolution, evaluation
//! history, and the schedule-level run guard.
//!
//! The engine never talks to a store; it receives immutable snapshots
//! produced here.

#![forbid(unsafe_code)]

mod error;
mod guard;
mod history;
mod registry;
mod store;
mod templates;
mod validate;
mod violations;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::PolicyError;
pub use guard::{RunGuard, RunPermit};
pub use history::{EvaluationHistory, RunRecord};
pub use registry::PolicyRegistry;
pub use store::{InMemoryPolicyStore, PolicyStore};
pub use templates::{instantiate_template, template_ids};
pub use validate::validate_policy;
pub use violations::ViolationLog;
