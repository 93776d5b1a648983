//! Policy scope matching.

use depsentry_types::{Dependency, EvaluationContext, PolicyScope};

/// Whether a dependency falls inside a policy's declared scope.
///
/// Every check is set membership. An empty declared set is "unrestricted",
/// never "excludes everything". Environment and project membership are only
/// checked when the evaluation context carries the corresponding field.
pub fn in_scope(dependency: &Dependency, scope: &PolicyScope, context: &EvaluationContext) -> bool {
    if !scope.ecosystems.is_empty() && !scope.ecosystems.contains(&dependency.ecosystem) {
        return false;
    }
    if !scope.dependency_kinds.is_empty() && !scope.dependency_kinds.contains(&dependency.kind) {
        return false;
    }
    if !scope.usage_scopes.is_empty() && !scope.usage_scopes.contains(&dependency.usage_scope) {
        return false;
    }
    if let Some(environment) = &context.environment
        && !scope.environments.is_empty()
        && !scope.environments.contains(environment)
    {
        return false;
    }
    if let Some(project) = &context.project
        && !scope.projects.is_empty()
        && !scope.projects.contains(project)
    {
        return false;
    }
    true
}
