//! # intentum-core: Intent Inference Primitives
//!
//! This crate is the leaf of the Intentum workspace. It defines the behavior
//! model, the intent and confidence types, the [`IntentModel`] contract, and
//! every inference strategy that does not need an external embedding
//! provider. `intentum-ai` and `intentum-runtime` both depend on it; it
//! depends on nothing internal.
//!
//! ## Data Flow
//!
//! ```text
//! BehaviorEvent ─observe─▶ BehaviorSpace ─to_vector─▶ BehaviorVector
//!                                │                          │
//!                                └───────▶ IntentModel ◀────┘
//!                                              │
//!                                              ▼
//!                                           Intent
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **One contract.** Every strategy and every wrapper implements
//!    [`IntentModel::infer`]. Composite models hold inner models; they never
//!    inherit from them.
//!
//! 2. **Explicit vector cache.** [`BehaviorSpace`] caches only the
//!    no-options vector. Normalized and windowed vectors always recompute.
//!
//! 3. **Tagged metadata.** Event and space metadata use [`MetadataValue`]
//!    (`Text | Number | Bool`), never an open dynamic type.
//!
//! 4. **Errors are values.** Configuration mistakes fail at construction,
//!    provider failures propagate unchanged, cancellation is a distinct
//!    [`InferenceError::Cancelled`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `intentum-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod behavior;
pub mod cancellation;
pub mod confidence;
pub mod digest;
pub mod error;
pub mod intent;
pub mod model;
pub mod models;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use behavior::{
    BehaviorEvent, BehaviorSpace, BehaviorSpaceBuilder, BehaviorVector, MetadataValue,
    SanitizationOptions, ToVectorOptions, VectorNormalization,
};
pub use cancellation::CancellationToken;
pub use confidence::{
    clamp_score, ConfidenceCalculator, ConfidenceLevel, DefaultConfidenceCalculator,
    FixedConfidenceCalculator, IntentConfidence, ThresholdConfidenceCalculator,
};
pub use digest::{sha256_hex, ContentDigest};
pub use error::{
    ConfigurationError, EmbeddingFailure, InferenceError, IntentumError, IntentumResult,
    ProviderFailureKind,
};
pub use intent::{Intent, IntentSignal, UNKNOWN_INTENT};
pub use model::{resolve_vector, IntentModel};
pub use temporal::TimeWindow;
