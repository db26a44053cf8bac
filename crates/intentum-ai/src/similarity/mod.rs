//! # Similarity Engines
//!
//! Combine a set of embeddings into one intent score in `[0, 1]`.
//!
//! | Engine | Rule |
//! |--------|------|
//! | [`SimpleAverageSimilarityEngine`] | mean score, optional per-source weights |
//! | [`WeightedAverageSimilarityEngine`] | configured per-source weights with a default |
//! | [`CosineSimilarityEngine`] | mean pairwise cosine of vectors, mapped to `[0, 1]` |
//! | [`TimeDecaySimilarityEngine`] | recency-weighted mean over the space's timestamps |
//! | [`CompositeSimilarityEngine`] | weighted mean of member engines |
//!
//! Every engine returns 0 for an empty embedding set.

mod average;
mod composite;
mod cosine;
mod time_decay;
mod weighted;

use std::collections::BTreeMap;

use intentum_core::BehaviorSpace;

use crate::embedding::IntentEmbedding;

pub use average::SimpleAverageSimilarityEngine;
pub use composite::CompositeSimilarityEngine;
pub use cosine::CosineSimilarityEngine;
pub use time_decay::{TimeDecaySimilarityEngine, DEFAULT_HALF_LIFE_SECS};
pub use weighted::WeightedAverageSimilarityEngine;

/// Per-source weights, keyed by embedding source.
pub type SourceWeights = BTreeMap<String, f64>;

/// Turns embeddings into a single score.
pub trait SimilarityEngine: Send + Sync {
    fn calculate(&self, embeddings: &[IntentEmbedding]) -> f64;

    /// Score with caller-supplied per-source weights. Engines that have no
    /// use for weights ignore them.
    fn calculate_weighted(
        &self,
        embeddings: &[IntentEmbedding],
        source_weights: Option<&SourceWeights>,
    ) -> f64 {
        let _ = source_weights;
        self.calculate(embeddings)
    }

    /// The time-aware view of this engine, if it has one.
    fn as_time_aware(&self) -> Option<&dyn TimeAwareSimilarityEngine> {
        None
    }
}

/// An engine that can weight embeddings by the recency of their source
/// events in a space.
pub trait TimeAwareSimilarityEngine: SimilarityEngine {
    fn calculate_with_time_decay(
        &self,
        space: &BehaviorSpace,
        embeddings: &[IntentEmbedding],
    ) -> f64;
}

/// Plain mean of embedding scores. Zero when empty.
pub(crate) fn mean_score(embeddings: &[IntentEmbedding]) -> f64 {
    if embeddings.is_empty() {
        return 0.0;
    }
    embeddings.iter().map(|e| e.score).sum::<f64>() / embeddings.len() as f64
}

/// `sum(score * w) / sum(w)`, or `None` when the total weight is not positive.
pub(crate) fn weighted_mean<F>(embeddings: &[IntentEmbedding], weight_of: F) -> Option<f64>
where
    F: Fn(&IntentEmbedding) -> f64,
{
    let (weighted, total) = embeddings.iter().fold((0.0, 0.0), |(acc, total), e| {
        let w = weight_of(e);
        (acc + e.score * w, total + w)
    });
    (total > 0.0).then(|| weighted / total)
}
