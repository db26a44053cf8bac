//! # intentum-ai: Embedding-Backed Inference
//!
//! Everything in Intentum that talks to an embedding provider:
//!
//! - **embedding**: the [`EmbeddingProvider`] contract and [`IntentEmbedding`].
//! - **mock**: a deterministic SHA-256-derived provider for tests and demos.
//! - **cache**: [`EmbeddingCache`], an in-memory implementation, and
//!   [`CachedEmbeddingProvider`].
//! - **similarity**: engines that fold embeddings into one score.
//! - **llm**: [`LlmIntentModel`], the embedding-similarity
//!   [`IntentModel`](intentum_core::IntentModel).
//!
//! ## Error Policy
//!
//! Provider failures surface as
//! [`InferenceError::Provider`](intentum_core::InferenceError::Provider)
//! without retry or substitution. A wrong intent is worse than a visible
//! failure.

pub mod cache;
pub mod embedding;
pub mod llm;
pub mod mock;
pub mod similarity;

pub use cache::{CachedEmbeddingProvider, EmbeddingCache, MemoryEmbeddingCache};
pub use embedding::{normalize_score, EmbeddingProvider, IntentEmbedding};
pub use llm::{LlmIntentModel, AI_INTENT_NAME, AI_SIGNAL_SOURCE};
pub use mock::MockEmbeddingProvider;
pub use similarity::{
    CompositeSimilarityEngine, CosineSimilarityEngine, SimilarityEngine,
    SimpleAverageSimilarityEngine, SourceWeights, TimeAwareSimilarityEngine,
    TimeDecaySimilarityEngine, WeightedAverageSimilarityEngine,
};
