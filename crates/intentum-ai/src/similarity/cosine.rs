use super::{mean_score, SimilarityEngine};
use crate::embedding::IntentEmbedding;

const MAGNITUDE_EPSILON: f64 = 1e-10;

/// Mean pairwise cosine similarity, mapped from `[-1, 1]` into `[0, 1]`.
///
/// Falls back to the mean score when any embedding lacks a vector or when
/// vector lengths differ. A single embedding returns its own score.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarityEngine;

/// Cosine of two equal-length vectors, mapped into `[0, 1]`. A near-zero
/// vector yields 0. `None` when lengths differ.
pub fn mapped_cosine(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let (mag_a, mag_b) = (mag_a.sqrt(), mag_b.sqrt());
    if mag_a < MAGNITUDE_EPSILON || mag_b < MAGNITUDE_EPSILON {
        return Some(0.0);
    }
    Some((dot / (mag_a * mag_b) + 1.0) / 2.0)
}

impl SimilarityEngine for CosineSimilarityEngine {
    fn calculate(&self, embeddings: &[IntentEmbedding]) -> f64 {
        if embeddings.is_empty() {
            return 0.0;
        }
        let vectors: Option<Vec<&[f64]>> = embeddings.iter().map(|e| e.usable_vector()).collect();
        let Some(vectors) = vectors else {
            return mean_score(embeddings);
        };
        if vectors.len() == 1 {
            return embeddings[0].score;
        }

        let mut sum = 0.0;
        let mut pairs = 0usize;
        for i in 0..vectors.len() {
            for j in (i + 1)..vectors.len() {
                match mapped_cosine(vectors[i], vectors[j]) {
                    Some(similarity) => {
                        sum += similarity;
                        pairs += 1;
                    }
                    None => {
                        tracing::debug!(
                            left = %embeddings[i].source,
                            right = %embeddings[j].source,
                            "embedding vector lengths differ; using mean score"
                        );
                        return mean_score(embeddings);
                    }
                }
            }
        }
        sum / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(source: &str, score: f64, vector: &[f64]) -> IntentEmbedding {
        IntentEmbedding::new(source, score).with_vector(vector.to_vec())
    }

    #[test]
    fn identical_vectors_score_one() {
        let s = CosineSimilarityEngine
            .calculate(&[v("a", 0.1, &[1.0, 0.0]), v("b", 0.1, &[2.0, 0.0])]);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opposite_vectors_score_zero() {
        let s = CosineSimilarityEngine
            .calculate(&[v("a", 0.9, &[1.0, 0.0]), v("b", 0.9, &[-1.0, 0.0])]);
        assert!(s.abs() < 1e-12);
    }

    #[test]
    fn orthogonal_vectors_score_half() {
        let s = CosineSimilarityEngine
            .calculate(&[v("a", 0.0, &[1.0, 0.0]), v("b", 0.0, &[0.0, 1.0])]);
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_embedding_returns_its_score() {
        assert_eq!(CosineSimilarityEngine.calculate(&[v("a", 0.37, &[1.0, 2.0])]), 0.37);
    }

    #[test]
    fn missing_vector_falls_back_to_mean() {
        let s = CosineSimilarityEngine.calculate(&[
            v("a", 0.2, &[1.0, 0.0]),
            IntentEmbedding::new("b", 0.6),
        ]);
        assert!((s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_falls_back_to_mean() {
        let s = CosineSimilarityEngine.calculate(&[v("a", 0.2, &[1.0, 0.0]), v("b", 0.6, &[1.0])]);
        assert!((s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_pair_is_zero() {
        assert_eq!(mapped_cosine(&[0.0, 0.0], &[1.0, 0.0]), Some(0.0));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(CosineSimilarityEngine.calculate(&[]), 0.0);
    }
}
