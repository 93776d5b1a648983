//! The policy repository interface and its in-memory implementation.
//!
//! The engine is handed pre-fetched snapshots; only administrative code
//! touches a store. Implementations backed by a file or database slot in
//! behind the same trait without touching engine logic.

use depsentry_types::Policy;
use std::collections::BTreeMap;
use std::sync::RwLock;

pub trait PolicyStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Policy>;
    /// All policies for a tenant, in stable id order.
    fn list(&self, tenant_id: &str) -> Vec<Policy>;
    fn put(&self, policy: Policy);
    fn delete(&self, id: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    inner: RwLock<BTreeMap<String, Policy>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn get(&self, id: &str) -> Option<Policy> {
        self.inner.read().ok()?.get(id).cloned()
    }

    fn list(&self, tenant_id: &str) -> Vec<Policy> {
        self.inner
            .read()
            .map(|map| {
                map.values()
                    .filter(|p| p.tenant_id == tenant_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn put(&self, policy: Policy) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(policy.id.clone(), policy);
        }
    }

    fn delete(&self, id: &str) -> bool {
        self.inner
            .write()
            .map(|mut map| map.remove(id).is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::minimal_policy;

    #[test]
    fn put_get_list_delete_roundtrip() {
        let store = InMemoryPolicyStore::new();
        store.put(minimal_policy("p1"));
        store.put(minimal_policy("p2"));
        let mut foreign = minimal_policy("p3");
        foreign.tenant_id = "tenant-2".to_string();
        store.put(foreign);

        assert!(store.get("p1").is_some());
        assert_eq!(store.list("tenant-1").len(), 2);
        assert_eq!(store.list("tenant-2").len(), 1);

        assert!(store.delete("p1"));
        assert!(!store.delete("p1"));
        assert!(store.get("p1").is_none());
    }
}
