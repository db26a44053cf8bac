//! # Runtime Error Types
//!
//! Three families, matching the three places the policy layer can go wrong:
//!
//! - [`RuleError`]: a fallible predicate could not evaluate. The engine
//!   never propagates these; it falls back to `Observe` and records them.
//! - [`PolicyStoreError`]: a declarative policy document failed to parse or
//!   named something the store does not understand. Fails at load time.
//! - [`ConfigError`]: an environment variable held an unusable value.

use thiserror::Error;

/// Failure inside a fallible rule predicate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("rule evaluation failed: {0}")]
    Evaluation(String),

    #[error("rule requires context field `{0}`")]
    MissingContext(&'static str),
}

/// Failure loading or compiling a policy document.
#[derive(Error, Debug)]
pub enum PolicyStoreError {
    #[error("invalid JSON policy document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML policy document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot read policy document: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule `{rule}`: unknown property `{property}`")]
    UnknownProperty { rule: String, property: String },

    #[error("rule `{rule}`: unknown operator `{operator}`")]
    UnknownOperator { rule: String, operator: String },

    #[error("rule `{rule}`: unknown decision `{decision}`")]
    UnknownDecision { rule: String, decision: String },

    #[error("rule `{rule}`: invalid value for `{property}`: {reason}")]
    InvalidValue {
        rule: String,
        property: String,
        reason: String,
    },
}

/// Invalid runtime configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}
