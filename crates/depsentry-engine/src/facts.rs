//! Fact records: the flattened view of a dependency that conditions
//! evaluate against.
//!
//! Field access is an enumerated table, not reflective path traversal:
//! every addressable field has a named extractor, so policy validation can
//! reject unknown fields before a policy is ever evaluated.

use depsentry_types::{Dependency, EvaluationContext, RuleType, Vulnerability};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Inputs a field extractor may draw from.
pub struct FactSource<'a> {
    pub dependency: &'a Dependency,
    pub context: &'a EvaluationContext,
    pub now: OffsetDateTime,
}

type Extractor = fn(&FactSource<'_>) -> Option<JsonValue>;

/// Base fields available to every rule type.
static BASE_FIELDS: &[(&str, Extractor)] = &[
    ("name", |s| Some(json!(s.dependency.name))),
    ("version", |s| Some(json!(s.dependency.version))),
    ("kind", |s| serde_json::to_value(s.dependency.kind).ok()),
    ("usage_scope", |s| {
        serde_json::to_value(s.dependency.usage_scope).ok()
    }),
    ("ecosystem", |s| Some(json!(s.dependency.ecosystem))),
    ("package_file", |s| Some(json!(s.dependency.package_file))),
    ("license", |s| {
        s.dependency.licenses.first().map(|l| json!(l))
    }),
    ("licenses", |s| Some(json!(s.dependency.licenses))),
    ("days_since_last_update", |s| {
        s.dependency
            .last_update
            .map(|t| json!((s.now - t).whole_days()))
    }),
    ("context.project", |s| {
        s.context.project.as_ref().map(|v| json!(v))
    }),
    ("context.environment", |s| {
        s.context.environment.as_ref().map(|v| json!(v))
    }),
    ("context.scan_id", |s| {
        s.context.scan_id.as_ref().map(|v| json!(v))
    }),
    ("context.build_id", |s| {
        s.context.build_id.as_ref().map(|v| json!(v))
    }),
    ("context.commit_id", |s| {
        s.context.commit_id.as_ref().map(|v| json!(v))
    }),
    ("context.pull_request_id", |s| {
        s.context.pull_request_id.as_ref().map(|v| json!(v))
    }),
];

/// Vulnerability fields, populated only for `vulnerability` rules. The
/// scalar attributes come from the highest-severity attached vulnerability.
static VULNERABILITY_FIELDS: &[(&str, Extractor)] = &[
    ("vulnerability.count", |s| {
        Some(json!(s.dependency.vulnerabilities.len()))
    }),
    ("vulnerability.id", |s| worst(s).map(|v| json!(v.id))),
    ("vulnerability.severity", |s| {
        worst(s).and_then(|v| serde_json::to_value(v.severity).ok())
    }),
    ("vulnerability.title", |s| {
        worst(s).and_then(|v| v.title.as_ref().map(|t| json!(t)))
    }),
    ("vulnerability.cvss_score", |s| {
        worst(s).and_then(|v| v.cvss_score.map(|c| json!(c)))
    }),
    ("vulnerability.fix_version", |s| {
        worst(s).and_then(|v| v.fix_version.as_ref().map(|f| json!(f)))
    }),
];

fn worst<'a>(s: &'a FactSource<'_>) -> Option<&'a Vulnerability> {
    s.dependency.vulnerabilities.iter().max_by_key(|v| v.severity)
}

/// A flattened, fully materialized fact record for one dependency.
#[derive(Clone, Debug, Default)]
pub struct FactRecord {
    values: BTreeMap<String, JsonValue>,
}

impl FactRecord {
    /// Enrich a raw dependency into the record a rule of `rule_type`
    /// evaluates against.
    pub fn build(
        dependency: &Dependency,
        context: &EvaluationContext,
        rule_type: RuleType,
        now: OffsetDateTime,
    ) -> Self {
        let source = FactSource {
            dependency,
            context,
            now,
        };

        let mut values = BTreeMap::new();
        for (field, extract) in BASE_FIELDS {
            if let Some(value) = extract(&source) {
                values.insert((*field).to_string(), value);
            }
        }
        if rule_type == RuleType::Vulnerability {
            for (field, extract) in VULNERABILITY_FIELDS {
                if let Some(value) = extract(&source) {
                    values.insert((*field).to_string(), value);
                }
            }
        }
        FactRecord { values }
    }

    /// Resolve a field. Absent and JSON-null are both "undefined".
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.values.get(field).filter(|v| !v.is_null())
    }

    /// The observed value for evidence recording (`null` when undefined).
    pub fn actual(&self, field: &str) -> JsonValue {
        self.get(field).cloned().unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
impl FactRecord {
    pub(crate) fn from_pairs(pairs: &[(&str, JsonValue)]) -> Self {
        FactRecord {
            values: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        }
    }
}

/// Whether a condition field is addressable at all. Used by policy
/// validation so unknown fields fail fast at creation time instead of
/// silently evaluating to undefined.
pub fn is_known_field(field: &str) -> bool {
    BASE_FIELDS.iter().any(|(name, _)| *name == field)
        || VULNERABILITY_FIELDS.iter().any(|(name, _)| *name == field)
}

/// All addressable field names, for validation error messages.
pub fn known_fields() -> impl Iterator<Item = &'static str> {
    BASE_FIELDS
        .iter()
        .chain(VULNERABILITY_FIELDS.iter())
        .map(|(name, _)| *name)
}
