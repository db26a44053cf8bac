//! Confidence-adjusting wrapper that downgrades by one level.

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::confidence::{ConfidenceLevel, IntentConfidence};
use crate::error::InferenceError;
use crate::intent::Intent;
use crate::model::IntentModel;

/// Representative score for a result downgraded to High.
pub const STRICT_HIGH_SCORE: f64 = 0.8;
/// Representative score for a result downgraded to Medium.
pub const STRICT_MEDIUM_SCORE: f64 = 0.55;
/// Score for a Medium result downgraded to Low, and the ceiling for Low and
/// None results.
pub const STRICT_LOW_SCORE: f64 = 0.25;

/// Downgrades the inner result by exactly one level.
///
/// | Inner level | Result |
/// |-------------|--------|
/// | Certain | High, 0.8 |
/// | High | Medium, 0.55 |
/// | Medium | Low, 0.25 |
/// | Low or None | Low, `min(score, 0.25)` |
///
/// Scores are replaced, not scaled. Name, signals, and reasoning pass
/// through.
pub struct StrictIntentModel<M> {
    inner: M,
}

impl<M: IntentModel> StrictIntentModel<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Downgrade a confidence by one level.
pub fn downgrade(confidence: IntentConfidence) -> IntentConfidence {
    match confidence.level() {
        ConfidenceLevel::Certain => IntentConfidence::new(STRICT_HIGH_SCORE, ConfidenceLevel::High),
        ConfidenceLevel::High => {
            IntentConfidence::new(STRICT_MEDIUM_SCORE, ConfidenceLevel::Medium)
        }
        ConfidenceLevel::Medium => IntentConfidence::new(STRICT_LOW_SCORE, ConfidenceLevel::Low),
        ConfidenceLevel::Low | ConfidenceLevel::None => {
            IntentConfidence::new(confidence.score().min(STRICT_LOW_SCORE), ConfidenceLevel::Low)
        }
    }
}

impl<M: IntentModel> IntentModel for StrictIntentModel<M> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let mut intent = self.inner.infer(space, precomputed)?;
        intent.confidence = downgrade(intent.confidence);
        Ok(intent)
    }
}
