//! # Embeddings
//!
//! The external Embedding Provider contract: given a dimension key
//! (`actor:action`), return a source label, a score in `[0, 1]`, and an
//! optional vector.
//!
//! Providers may be deterministic mocks or network clients. Failures are
//! reported as [`EmbeddingFailure`] and are never retried here; retry and
//! backoff belong to the provider implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use intentum_core::{clamp_score, EmbeddingFailure};

/// One provider answer for one dimension key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentEmbedding {
    pub source: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f64>>,
}

impl IntentEmbedding {
    /// An embedding with no vector. The score is clamped into `[0, 1]`.
    pub fn new(source: impl Into<String>, score: f64) -> Self {
        Self {
            source: source.into(),
            score: clamp_score(score),
            vector: None,
        }
    }

    pub fn with_vector(mut self, vector: Vec<f64>) -> Self {
        self.vector = Some(vector);
        self
    }

    /// The vector, if present and non-empty.
    pub fn usable_vector(&self) -> Option<&[f64]> {
        self.vector.as_deref().filter(|v| !v.is_empty())
    }
}

/// Supplies embeddings for dimension keys.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one dimension key.
    ///
    /// # Errors
    ///
    /// The provider's own failure (rate limiting, timeout, HTTP status,
    /// malformed response).
    fn embed(&self, key: &str) -> Result<IntentEmbedding, EmbeddingFailure>;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn embed(&self, key: &str) -> Result<IntentEmbedding, EmbeddingFailure> {
        (**self).embed(key)
    }
}

/// Mean absolute value of `values`, clamped into `[0, 1]`. Zero when empty.
pub fn normalize_score(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean_abs = values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64;
    clamp_score(mean_abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_score_mean_abs() {
        assert_eq!(normalize_score(&[]), 0.0);
        assert_eq!(normalize_score(&[-0.5, 0.5]), 0.5);
        assert_eq!(normalize_score(&[3.0, -4.0]), 1.0);
    }

    #[test]
    fn embedding_score_is_clamped() {
        assert_eq!(IntentEmbedding::new("k", 1.7).score, 1.0);
        assert_eq!(IntentEmbedding::new("k", -0.2).score, 0.0);
    }

    #[test]
    fn empty_vector_is_not_usable() {
        let e = IntentEmbedding::new("k", 0.5).with_vector(vec![]);
        assert!(e.usable_vector().is_none());
        let e = IntentEmbedding::new("k", 0.5).with_vector(vec![1.0]);
        assert_eq!(e.usable_vector(), Some(&[1.0][..]));
    }

    #[test]
    fn serde_omits_missing_vector() {
        let json = serde_json::to_string(&IntentEmbedding::new("user:login", 0.25)).unwrap();
        assert_eq!(json, r#"{"source":"user:login","score":0.25}"#);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalized_score_in_unit_range(
                values in proptest::collection::vec(-10.0f64..10.0, 0..20),
            ) {
                let s = normalize_score(&values);
                prop_assert!((0.0..=1.0).contains(&s));
            }
        }
    }
}
