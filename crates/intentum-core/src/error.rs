//! # Error Hierarchy
//!
//! Structured error types for intent inference, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Errors fall into three classes:
//!
//! - **Configuration**: fatal, raised at construction time (empty stage
//!   lists, missing builder fields). Never silently defaulted.
//! - **Provider**: an external embedding provider failed. Propagated to the
//!   caller of `infer` unmodified; the core never retries or swallows it.
//! - **Cancellation**: a batch run was cancelled before it finished.

use thiserror::Error;

/// Top-level error type for Intentum.
#[derive(Error, Debug)]
pub enum IntentumError {
    /// Construction-time misconfiguration.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Inference failure.
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the workspace.
pub type IntentumResult<T> = Result<T, IntentumError>;

/// Errors raised while constructing models, engines, or builders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A multi-stage model was built with no stages.
    #[error("at least one inference stage is required")]
    EmptyStages,

    /// A composite similarity engine was built with no member engines.
    #[error("at least one similarity engine is required")]
    EmptyEngines,

    /// A required field was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A supplied value is outside its permitted domain.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Classification of an embedding provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailureKind {
    /// The provider throttled the request.
    RateLimited,
    /// The request timed out.
    Timeout,
    /// The provider answered with a non-success HTTP status.
    Http(u16),
    /// The response could not be interpreted.
    MalformedResponse,
    /// Anything else.
    Other,
}

impl std::fmt::Display for ProviderFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited => f.write_str("rate limited"),
            Self::Timeout => f.write_str("timeout"),
            Self::Http(status) => write!(f, "HTTP {status}"),
            Self::MalformedResponse => f.write_str("malformed response"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// A failure reported by an external embedding provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("embedding provider {provider} failed ({kind}): {message}")]
pub struct EmbeddingFailure {
    /// Provider name (e.g. "openai", "mock").
    pub provider: String,
    /// Failure classification.
    pub kind: ProviderFailureKind,
    /// Provider-supplied detail.
    pub message: String,
}

impl EmbeddingFailure {
    /// Create a new provider failure.
    pub fn new(
        provider: impl Into<String>,
        kind: ProviderFailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`IntentModel::infer`](crate::model::IntentModel::infer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The embedding provider failed; carried through unmodified.
    #[error(transparent)]
    Provider(#[from] EmbeddingFailure),

    /// A batch run observed its cancellation token.
    #[error("inference cancelled")]
    Cancelled,

    /// A model was misconfigured in a way only detectable at call time.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An async batch worker could not be joined.
    #[error("inference task failed: {0}")]
    Task(String),
}
