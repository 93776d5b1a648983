use thiserror::Error;

/// Structural and administrative errors. All are raised synchronously at
/// creation/update/lookup time; evaluation assumes validated structures and
/// never raises these.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy '{policy_id}' has no rules")]
    NoRules { policy_id: String },

    #[error("rule '{rule_id}' has no conditions")]
    RuleWithoutConditions { rule_id: String },

    #[error("rule '{rule_id}' has no actions")]
    RuleWithoutActions { rule_id: String },

    #[error("rule '{rule_id}' references unknown field '{field}'")]
    UnknownField { rule_id: String, field: String },

    #[error("rule '{rule_id}' has an invalid regex for field '{field}': {pattern}")]
    InvalidRegex {
        rule_id: String,
        field: String,
        pattern: String,
    },

    #[error("rule '{rule_id}' has a create_issue action without issue_tracker config")]
    MissingIssueTracker { rule_id: String },

    #[error("rule '{rule_id}' has an escalate action with level 0 (must be >= 1)")]
    InvalidEscalationLevel { rule_id: String },

    #[error("policy version '{version}' is not a MAJOR.MINOR.PATCH semver string")]
    InvalidVersion { version: String },

    #[error("policy '{policy_id}' already exists")]
    DuplicateId { policy_id: String },

    #[error("policy '{policy_id}' not found")]
    NotFound { policy_id: String },

    #[error("unknown policy template '{template_id}'")]
    UnknownTemplate { template_id: String },

    #[error("violation '{violation_id}' not found")]
    ViolationNotFound { violation_id: String },
}
