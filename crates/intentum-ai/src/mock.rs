//! Deterministic in-process embedding provider for tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use intentum_core::{ContentDigest, EmbeddingFailure, ProviderFailureKind};

use crate::embedding::{normalize_score, EmbeddingProvider, IntentEmbedding};

/// Length of the vectors the mock produces.
pub const MOCK_VECTOR_DIMENSION: usize = 8;

const PROVIDER_NAME: &str = "mock";

/// Derives embeddings from a SHA-256 of the key.
///
/// Equal keys always get equal embeddings, across processes and runs.
/// Scores and failures can be pinned per key.
#[derive(Debug, Default)]
pub struct MockEmbeddingProvider {
    scores: HashMap<String, f64>,
    failures: HashMap<String, ProviderFailureKind>,
    calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the score returned for `key`.
    pub fn with_score(mut self, key: impl Into<String>, score: f64) -> Self {
        self.scores.insert(key.into(), score);
        self
    }

    /// Fail every request for `key`.
    pub fn failing_on(mut self, key: impl Into<String>, kind: ProviderFailureKind) -> Self {
        self.failures.insert(key.into(), kind);
        self
    }

    /// Number of `embed` calls served, including failures.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Unit-length vector in `MOCK_VECTOR_DIMENSION` dimensions plus the raw
/// components it was derived from.
fn derive(key: &str) -> (Vec<f64>, Vec<f64>) {
    let digest = ContentDigest::of(key.as_bytes());
    let raw: Vec<f64> = digest
        .bytes
        .chunks_exact(4)
        .take(MOCK_VECTOR_DIMENSION)
        .map(|chunk| {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            (f64::from(word) / f64::from(u32::MAX)) * 2.0 - 1.0
        })
        .collect();
    let magnitude = raw.iter().map(|x| x * x).sum::<f64>().sqrt();
    let unit = if magnitude > 0.0 {
        raw.iter().map(|x| x / magnitude).collect()
    } else {
        raw.clone()
    };
    (raw, unit)
}

impl EmbeddingProvider for MockEmbeddingProvider {
    fn embed(&self, key: &str) -> Result<IntentEmbedding, EmbeddingFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.failures.get(key) {
            return Err(EmbeddingFailure::new(
                PROVIDER_NAME,
                kind.clone(),
                format!("configured failure for {key}"),
            ));
        }
        let (raw, unit) = derive(key);
        let score = self
            .scores
            .get(key)
            .copied()
            .unwrap_or_else(|| normalize_score(&raw));
        Ok(IntentEmbedding::new(key, score).with_vector(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_key() {
        let p = MockEmbeddingProvider::new();
        assert_eq!(p.embed("user:login").unwrap(), p.embed("user:login").unwrap());
        assert_ne!(
            p.embed("user:login").unwrap().vector,
            p.embed("user:logout").unwrap().vector
        );
        assert_eq!(p.calls(), 4);
    }

    #[test]
    fn vector_is_unit_length() {
        let e = MockEmbeddingProvider::new().embed("a:b").unwrap();
        let v = e.vector.unwrap();
        assert_eq!(v.len(), MOCK_VECTOR_DIMENSION);
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn source_is_the_key() {
        let e = MockEmbeddingProvider::new().embed("user:retry").unwrap();
        assert_eq!(e.source, "user:retry");
        assert!((0.0..=1.0).contains(&e.score));
    }

    #[test]
    fn pinned_score() {
        let p = MockEmbeddingProvider::new().with_score("user:retry", 0.95);
        assert_eq!(p.embed("user:retry").unwrap().score, 0.95);
    }

    #[test]
    fn configured_failure() {
        let p = MockEmbeddingProvider::new().failing_on("x:y", ProviderFailureKind::RateLimited);
        let err = p.embed("x:y").unwrap_err();
        assert_eq!(err.kind, ProviderFailureKind::RateLimited);
        assert_eq!(err.provider, "mock");
        assert!(p.embed("other:key").is_ok());
    }
}
