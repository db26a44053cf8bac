use super::{weighted_mean, SimilarityEngine, SourceWeights};
use crate::embedding::IntentEmbedding;

/// Weighted mean with per-source weights fixed at construction.
///
/// When the caller supplies source weights, they replace the configured
/// map for that call. Unknown sources get `default_weight` either way.
#[derive(Debug, Clone)]
pub struct WeightedAverageSimilarityEngine {
    weights: SourceWeights,
    default_weight: f64,
}

impl Default for WeightedAverageSimilarityEngine {
    fn default() -> Self {
        Self::new(SourceWeights::new(), 1.0)
    }
}

impl WeightedAverageSimilarityEngine {
    pub fn new(weights: SourceWeights, default_weight: f64) -> Self {
        Self {
            weights,
            default_weight,
        }
    }

    fn score(&self, embeddings: &[IntentEmbedding], weights: &SourceWeights) -> f64 {
        weighted_mean(embeddings, |e| {
            weights.get(&e.source).copied().unwrap_or(self.default_weight)
        })
        .unwrap_or(0.0)
    }
}

impl SimilarityEngine for WeightedAverageSimilarityEngine {
    fn calculate(&self, embeddings: &[IntentEmbedding]) -> f64 {
        self.score(embeddings, &self.weights)
    }

    fn calculate_weighted(
        &self,
        embeddings: &[IntentEmbedding],
        source_weights: Option<&SourceWeights>,
    ) -> f64 {
        self.score(embeddings, source_weights.unwrap_or(&self.weights))
    }
}
