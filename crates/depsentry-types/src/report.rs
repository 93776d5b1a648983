use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::result::EnforcementResult;

/// Stable schema identifier for depsentry reports.
pub const SCHEMA_REPORT_V1: &str = "depsentry.report.v1";

/// Overall batch verdict: it maps cleanly to CI signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    /// Blocked dependencies fail the batch; warnings alone only warn.
    pub fn from_result(result: &EnforcementResult) -> Self {
        if result.summary.blocked_dependencies > 0 {
            Verdict::Fail
        } else if result.summary.warnings_detected > 0 || result.summary.violations_detected > 0 {
            Verdict::Warn
        } else {
            Verdict::Pass
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// The emitted report envelope.
///
/// Keeping this generic allows embedding tool-specific data while enforcing a
/// stable outer shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = EnforcementResult> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub verdict: Verdict,
    pub data: TData,
}
