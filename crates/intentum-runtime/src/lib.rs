//! # intentum-runtime: Policy Decisions
//!
//! Once an intent has been inferred, the runtime decides what to do about
//! it. Policies are ordered rule lists; the first rule whose predicate holds
//! assigns one of seven [`PolicyDecision`]s.
//!
//! ## Architecture
//!
//! - **Decision** (`decision.rs`): the closed seven-variant outcome type.
//!
//! - **Rules and Policies** (`rule.rs`, `policy.rs`, `context.rs`): intent-only
//!   and context-aware rules, the [`IntentPolicy`] builder, and composition
//!   via `with_base` and `merge`.
//!
//! - **Engine** (`engine.rs`): [`PolicyEngine`] evaluation with optional
//!   execution logging and the rate-limited decide path.
//!
//! - **Variants** (`variants.rs`): A/B selection between named policies.
//!
//! - **Rate Limiting** (`rate_limit.rs`): keyed fixed-window counters.
//!
//! - **Records** (`execution.rs`): execution records, the bounded
//!   [`ExecutionLog`], and the persistable [`DecisionRecord`].
//!
//! - **Store** (`store.rs`): JSON/YAML policy documents compiled into
//!   [`IntentPolicy`] values.
//!
//! - **Config** (`config.rs`): [`RuntimeConfig`] defaults and environment
//!   overrides.
//!
//! ## Crate Policy
//!
//! - Depends on `intentum-core` only.
//! - `decide*` never fails. Rule failures become `Observe` plus a log entry.
//! - Over-limit is a [`RateLimitResult`] value, not an error.

pub mod config;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod execution;
pub mod policy;
pub mod rate_limit;
pub mod rule;
pub mod store;
pub mod variants;

pub use config::{RateLimitOptions, RuntimeConfig, MAX_RATE_WINDOW_SECS};
pub use context::{
    ContextAwareIntentPolicy, ContextAwareIntentPolicyBuilder, IntentSummary, PolicyContext,
};
pub use decision::PolicyDecision;
pub use engine::PolicyEngine;
pub use error::{ConfigError, PolicyStoreError, RuleError};
pub use execution::{error_trace, DecisionRecord, ExecutionLog, PolicyExecutionRecord};
pub use policy::{IntentPolicy, IntentPolicyBuilder};
pub use rate_limit::{MemoryRateLimiter, RateLimitResult, RateLimiter};
pub use rule::{ContextPolicyRule, PolicyRule, RuleEvaluation, RuleFailure};
pub use store::{
    FilePolicyStore, PolicyConditionDocument, PolicyDocument, PolicyRuleDocument,
};
pub use variants::PolicyVariantSet;
