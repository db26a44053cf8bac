use intentum_core::ConfigurationError;

use super::SimilarityEngine;
use crate::embedding::IntentEmbedding;

/// Weighted mean of several engines' scores.
pub struct CompositeSimilarityEngine {
    engines: Vec<(Box<dyn SimilarityEngine>, f64)>,
}

impl std::fmt::Debug for CompositeSimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let weights: Vec<f64> = self.engines.iter().map(|(_, w)| *w).collect();
        f.debug_struct("CompositeSimilarityEngine")
            .field("weights", &weights)
            .finish()
    }
}

impl CompositeSimilarityEngine {
    /// # Errors
    ///
    /// [`ConfigurationError::EmptyEngines`] if `engines` is empty.
    pub fn new(engines: Vec<(Box<dyn SimilarityEngine>, f64)>) -> Result<Self, ConfigurationError> {
        if engines.is_empty() {
            return Err(ConfigurationError::EmptyEngines);
        }
        Ok(Self { engines })
    }

    /// Every engine weighted 1.0.
    pub fn equal(engines: Vec<Box<dyn SimilarityEngine>>) -> Result<Self, ConfigurationError> {
        Self::new(engines.into_iter().map(|e| (e, 1.0)).collect())
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl SimilarityEngine for CompositeSimilarityEngine {
    fn calculate(&self, embeddings: &[IntentEmbedding]) -> f64 {
        if embeddings.is_empty() {
            return 0.0;
        }
        let (weighted, total) = self
            .engines
            .iter()
            .fold((0.0, 0.0), |(acc, total), (engine, weight)| {
                (acc + engine.calculate(embeddings) * weight, total + weight)
            });
        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }
}
