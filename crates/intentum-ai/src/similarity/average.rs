use super::{mean_score, weighted_mean, SimilarityEngine, SourceWeights};
use crate::embedding::IntentEmbedding;

/// Mean of embedding scores.
///
/// With source weights, sources missing from the map weigh 1.0. If the
/// weights sum to zero or less, the plain mean is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAverageSimilarityEngine;

impl SimilarityEngine for SimpleAverageSimilarityEngine {
    fn calculate(&self, embeddings: &[IntentEmbedding]) -> f64 {
        mean_score(embeddings)
    }

    fn calculate_weighted(
        &self,
        embeddings: &[IntentEmbedding],
        source_weights: Option<&SourceWeights>,
    ) -> f64 {
        if embeddings.is_empty() {
            return 0.0;
        }
        match source_weights {
            Some(weights) if !weights.is_empty() => {
                weighted_mean(embeddings, |e| weights.get(&e.source).copied().unwrap_or(1.0))
                    .unwrap_or_else(|| mean_score(embeddings))
            }
            _ => mean_score(embeddings),
        }
    }
}
