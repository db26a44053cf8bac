//! # Embedding-Similarity Model
//!
//! Infers an intent by asking an [`EmbeddingProvider`] for one embedding per
//! vector dimension and combining them with a [`SimilarityEngine`].
//!
//! ## Scoring Path
//!
//! 1. Resolve the vector (precomputed, or the space's cached vector).
//! 2. Call the provider once per dimension key, in key order. The first
//!    provider failure aborts inference and is returned unchanged.
//! 3. If the engine is time-aware and the space has events, score with
//!    the space's timestamps. Otherwise call `calculate_weighted` with the
//!    vector's dimension values as source weights.
//! 4. Map the score through the confidence calculator.
//!
//! Every embedding becomes a signal, whatever its score.

use std::sync::Arc;

use intentum_core::{
    resolve_vector, BehaviorSpace, BehaviorVector, ConfidenceCalculator,
    DefaultConfidenceCalculator, InferenceError, Intent, IntentModel, IntentSignal,
    ToVectorOptions,
};

use crate::embedding::{EmbeddingProvider, IntentEmbedding};
use crate::similarity::{SimilarityEngine, SourceWeights};

/// Name of every intent this model produces.
pub const AI_INTENT_NAME: &str = "AI-Inferred-Intent";

/// Signal source for embedding-derived signals.
pub const AI_SIGNAL_SOURCE: &str = "ai";

/// Embedding-similarity intent model.
pub struct LlmIntentModel<P, E> {
    provider: P,
    engine: E,
    calculator: Arc<dyn ConfidenceCalculator>,
}

impl<P, E> std::fmt::Debug for LlmIntentModel<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmIntentModel").finish_non_exhaustive()
    }
}

impl<P: EmbeddingProvider, E: SimilarityEngine> LlmIntentModel<P, E> {
    pub fn new(provider: P, engine: E) -> Self {
        Self {
            provider,
            engine,
            calculator: Arc::new(DefaultConfidenceCalculator),
        }
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn ConfidenceCalculator>) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Infer over a normalized vector of `space`.
    pub fn infer_with_options(
        &self,
        space: &BehaviorSpace,
        options: &ToVectorOptions,
    ) -> Result<Intent, InferenceError> {
        let vector = space.to_vector_with(options);
        self.infer(space, Some(&vector))
    }

    fn embed_all(&self, vector: &BehaviorVector) -> Result<Vec<IntentEmbedding>, InferenceError> {
        vector
            .iter()
            .map(|(key, _)| self.provider.embed(key).map_err(InferenceError::from))
            .collect()
    }

    fn score(
        &self,
        space: &BehaviorSpace,
        vector: &BehaviorVector,
        embeddings: &[IntentEmbedding],
    ) -> f64 {
        if let Some(time_aware) = self.engine.as_time_aware() {
            if !space.is_empty() {
                return time_aware.calculate_with_time_decay(space, embeddings);
            }
        }
        let weights: SourceWeights = vector.iter().map(|(k, v)| (k.to_string(), v)).collect();
        self.engine.calculate_weighted(embeddings, Some(&weights))
    }
}

impl<P: EmbeddingProvider, E: SimilarityEngine> IntentModel for LlmIntentModel<P, E> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let vector = resolve_vector(space, precomputed);
        let embeddings = self.embed_all(vector).map_err(|e| {
            tracing::warn!(error = %e, dimensions = vector.len(), "embedding provider failed");
            e
        })?;

        let score = self.score(space, vector, &embeddings);
        let signals = embeddings
            .iter()
            .map(|e| IntentSignal::new(AI_SIGNAL_SOURCE, e.source.clone(), e.score))
            .collect();

        tracing::debug!(
            dimensions = vector.len(),
            score,
            "embedding-similarity inference complete"
        );
        Ok(Intent::new(AI_INTENT_NAME, signals, self.calculator.from_score(score)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEmbeddingProvider;
    use crate::similarity::{
        SimpleAverageSimilarityEngine, TimeDecaySimilarityEngine, WeightedAverageSimilarityEngine,
    };
    use chrono::{Duration, TimeZone, Utc};
    use intentum_core::{BehaviorEvent, ConfidenceLevel, ProviderFailureKind};
    use std::collections::BTreeMap;

    fn space(actions: &[&str]) -> BehaviorSpace {
        let mut s = BehaviorSpace::new();
        for a in actions {
            s.observe(BehaviorEvent::now("user", *a));
        }
        s
    }

    #[test]
    fn one_provider_call_per_dimension() {
        let model =
            LlmIntentModel::new(MockEmbeddingProvider::new(), SimpleAverageSimilarityEngine);
        let intent = model.infer(&space(&["login", "login", "retry", "submit"]), None).unwrap();
        assert_eq!(model.provider().calls(), 3);
        assert_eq!(intent.signals.len(), 3);
        assert_eq!(intent.name, AI_INTENT_NAME);
        assert!(intent.signals.iter().all(|s| s.source == AI_SIGNAL_SOURCE));
    }

    #[test]
    fn pinned_scores_flow_into_confidence() {
        let provider = MockEmbeddingProvider::new()
            .with_score("user:login", 0.9)
            .with_score("user:retry", 0.9);
        let model = LlmIntentModel::new(provider, SimpleAverageSimilarityEngine);
        let intent = model.infer(&space(&["login", "retry"]), None).unwrap();
        assert_eq!(intent.level(), ConfidenceLevel::Certain);
        assert!((intent.score() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn dimension_counts_are_source_weights() {
        let provider = MockEmbeddingProvider::new()
            .with_score("user:login", 1.0)
            .with_score("user:retry", 0.0);
        let model = LlmIntentModel::new(provider, WeightedAverageSimilarityEngine::default());
        let intent = model.infer(&space(&["login", "login", "login", "retry"]), None).unwrap();
        assert!((intent.score() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn provider_failure_propagates_unchanged() {
        let provider = MockEmbeddingProvider::new()
            .failing_on("user:retry", ProviderFailureKind::Http(429));
        let model = LlmIntentModel::new(provider, SimpleAverageSimilarityEngine);
        match model.infer(&space(&["login", "retry"]), None).unwrap_err() {
            InferenceError::Provider(f) => {
                assert_eq!(f.kind, ProviderFailureKind::Http(429));
                assert_eq!(f.provider, "mock");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn precomputed_vector_skips_derivation() {
        let mut dims = BTreeMap::new();
        dims.insert("only:this".to_string(), 1.0);
        let pre = BehaviorVector::from_dimensions(dims);
        let model =
            LlmIntentModel::new(MockEmbeddingProvider::new(), SimpleAverageSimilarityEngine);
        let s = space(&["a", "b"]);
        let intent = model.infer(&s, Some(&pre)).unwrap();
        assert_eq!(intent.signals.len(), 1);
        assert_eq!(intent.signals[0].description, "only:this");
        assert!(!s.is_vector_cached());
    }

    #[test]
    fn time_aware_engine_uses_space() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut s = BehaviorSpace::new();
        s.observe(BehaviorEvent::new("user", "fresh", now));
        s.observe(BehaviorEvent::new("user", "stale", now - Duration::hours(10)));
        let provider = MockEmbeddingProvider::new()
            .with_score("user:fresh", 0.9)
            .with_score("user:stale", 0.1);
        let engine = TimeDecaySimilarityEngine::at(Duration::hours(1), now);
        let model = LlmIntentModel::new(provider, engine);
        let intent = model.infer(&s, None).unwrap();
        assert!(intent.score() > 0.89);
    }

    #[test]
    fn empty_space_scores_zero() {
        let model =
            LlmIntentModel::new(MockEmbeddingProvider::new(), SimpleAverageSimilarityEngine);
        let intent = model.infer(&BehaviorSpace::new(), None).unwrap();
        assert_eq!(intent.score(), 0.0);
        assert!(intent.signals.is_empty());
        assert_eq!(model.provider().calls(), 0);
    }

    #[test]
    fn infer_with_options_uses_normalized_vector() {
        let model =
            LlmIntentModel::new(MockEmbeddingProvider::new(), SimpleAverageSimilarityEngine);
        let s = space(&["a", "a", "b"]);
        let intent = model.infer_with_options(&s, &ToVectorOptions::l1()).unwrap();
        assert_eq!(intent.signals.len(), 2);
        assert!(!s.is_vector_cached());
    }
}
