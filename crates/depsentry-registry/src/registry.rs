//! Policy lifecycle over a [`PolicyStore`].

use depsentry_types::{ChangeLogEntry, EnforcementMode, Policy};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::error::PolicyError;
use crate::store::PolicyStore;
use crate::templates;
use crate::validate::{bump_patch, validate_policy};

pub struct PolicyRegistry<S: PolicyStore> {
    store: S,
}

impl<S: PolicyStore> PolicyRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and store a new policy. Fails on structural problems and on
    /// id collisions.
    pub fn create_policy(&self, mut policy: Policy) -> Result<Policy, PolicyError> {
        validate_policy(&policy)?;
        if self.store.get(&policy.id).is_some() {
            return Err(PolicyError::DuplicateId {
                policy_id: policy.id.clone(),
            });
        }
        let now = OffsetDateTime::now_utc();
        policy.metadata.created_at.get_or_insert(now);
        policy.metadata.updated_at = Some(now);
        self.store.put(policy.clone());
        tracing::debug!(policy_id = %policy.id, "policy created");
        Ok(policy)
    }

    /// Validate and apply an update to an existing policy. Bumps the patch
    /// version and appends a change-log entry when the rule set changed.
    pub fn update_policy(&self, mut updated: Policy) -> Result<Policy, PolicyError> {
        let existing = self
            .store
            .get(&updated.id)
            .ok_or_else(|| PolicyError::NotFound {
                policy_id: updated.id.clone(),
            })?;
        validate_policy(&updated)?;

        let now = OffsetDateTime::now_utc();
        updated.version = bump_patch(&existing.version)?;
        updated.metadata.created_at = existing.metadata.created_at;
        updated.metadata.updated_at = Some(now);
        if existing.rules != updated.rules {
            updated.metadata.change_log.push(ChangeLogEntry {
                at: now,
                author: updated
                    .metadata
                    .owner
                    .clone()
                    .unwrap_or_else(|| "policy-admin".to_string()),
                note: "rule set updated".to_string(),
            });
        }
        self.store.put(updated.clone());
        tracing::debug!(policy_id = %updated.id, version = %updated.version, "policy updated");
        Ok(updated)
    }

    pub fn get_policy(&self, id: &str) -> Result<Policy, PolicyError> {
        self.store.get(id).ok_or_else(|| PolicyError::NotFound {
            policy_id: id.to_string(),
        })
    }

    pub fn list_policies(&self, tenant_id: &str) -> Vec<Policy> {
        self.store.list(tenant_id)
    }

    pub fn delete_policy(&self, id: &str) -> Result<(), PolicyError> {
        if self.store.delete(id) {
            Ok(())
        } else {
            Err(PolicyError::NotFound {
                policy_id: id.to_string(),
            })
        }
    }

    /// Immutable snapshot of the tenant's active policies for one
    /// evaluation run. Concurrent edits do not mutate a handed-out
    /// snapshot.
    pub fn snapshot(&self, tenant_id: &str) -> Arc<[Policy]> {
        self.store
            .list(tenant_id)
            .into_iter()
            .filter(|p| p.enabled && p.enforcement_mode != EnforcementMode::Disabled)
            .collect::<Vec<_>>()
            .into()
    }

    /// Instantiate a built-in template for a tenant and store the result.
    pub fn create_from_template(
        &self,
        template_id: &str,
        tenant_id: &str,
        policy_id: &str,
    ) -> Result<Policy, PolicyError> {
        let policy = templates::instantiate_template(template_id, tenant_id, policy_id)?;
        self.create_policy(policy)
    }
}
