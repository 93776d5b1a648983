use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 identity for a violation.
///
/// Identity fields:
/// - tenant id
/// - policy id
/// - rule id
/// - dependency name and version
///
/// One violation exists per (dependency, rule) trigger per run; deriving
/// the id from identity fields keeps violation construction free of
/// randomness and reproducible from its inputs.
pub fn violation_id(
    tenant_id: &str,
    policy_id: &str,
    rule_id: &str,
    dep_name: &str,
    dep_version: &str,
) -> String {
    let canonical = [tenant_id, policy_id, rule_id, dep_name, dep_version].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_and_distinct_per_identity() {
        let a = violation_id("t1", "p1", "r1", "lodash", "4.17.20");
        let b = violation_id("t1", "p1", "r1", "lodash", "4.17.20");
        let c = violation_id("t1", "p1", "r2", "lodash", "4.17.20");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
