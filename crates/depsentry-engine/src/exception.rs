//! Active-exception lookup.

use depsentry_types::{Dependency, Policy, PolicyException, Rule};
use time::OffsetDateTime;

/// Find an active, non-expired exception suppressing `rule` for
/// `dependency`. First match wins; exceptions carry no priority ordering.
///
/// A match suppresses the rule entirely for this dependency in this run:
/// no violation, no action execution, no evidence beyond the exception
/// itself.
pub fn find_active_exception<'a>(
    policy: &'a Policy,
    rule: &Rule,
    dependency: &Dependency,
    now: OffsetDateTime,
) -> Option<&'a PolicyException> {
    policy
        .exceptions
        .iter()
        .find(|e| e.rule_id == rule.id && e.dependency == dependency.name && e.is_active(now))
}
