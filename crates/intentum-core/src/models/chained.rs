//! Primary model with a fallback below a confidence threshold.

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::confidence::clamp_score;
use crate::error::InferenceError;
use crate::intent::Intent;
use crate::model::IntentModel;

/// Default primary acceptance threshold.
pub const DEFAULT_CHAIN_THRESHOLD: f64 = 0.7;

/// Tries `primary`; if its score is below `threshold`, runs `fallback`.
///
/// The returned reasoning always starts with `Primary:` or `Fallback:`.
pub struct ChainedIntentModel<P, F> {
    primary: P,
    fallback: F,
    threshold: f64,
}

impl<P, F> ChainedIntentModel<P, F>
where
    P: IntentModel,
    F: IntentModel,
{
    /// `threshold` is clamped into `[0, 1]`.
    pub fn new(primary: P, fallback: F, threshold: f64) -> Self {
        Self {
            primary,
            fallback,
            threshold: clamp_score(threshold),
        }
    }

    pub fn with_default_threshold(primary: P, fallback: F) -> Self {
        Self::new(primary, fallback, DEFAULT_CHAIN_THRESHOLD)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl<P, F> IntentModel for ChainedIntentModel<P, F>
where
    P: IntentModel,
    F: IntentModel,
{
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let mut primary = self.primary.infer(space, precomputed)?;
        if primary.score() >= self.threshold {
            let reasoning = match primary.reasoning.take() {
                Some(r) => format!("Primary: {r}"),
                None => "Primary: confidence above threshold".to_string(),
            };
            return Ok(primary.with_reasoning(reasoning));
        }

        tracing::debug!(
            primary = %primary.name,
            score = primary.score(),
            threshold = self.threshold,
            "chained model falling back"
        );
        let mut fallback = self.fallback.infer(space, precomputed)?;
        let reasoning = match fallback.reasoning.take() {
            Some(r) => format!("Fallback: {r}"),
            None => format!("Fallback: primary confidence below {}", self.threshold),
        };
        Ok(fallback.with_reasoning(reasoning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule_based::{RuleBasedIntentModel, RuleMatch};

    fn fixed(
        name: &'static str,
        score: f64,
        reasoning: Option<&'static str>,
    ) -> RuleBasedIntentModel {
        RuleBasedIntentModel::empty().rule(move |_| {
            let m = RuleMatch::new(name, score);
            Some(match reasoning {
                Some(r) => m.with_reasoning(r),
                None => m,
            })
        })
    }

    #[test]
    fn primary_above_threshold() {
        let model = ChainedIntentModel::new(
            fixed("Primary", 0.9, Some("rule hit")),
            fixed("Fb", 0.5, None),
            0.8,
        );
        let intent = model.infer(&BehaviorSpace::new(), None).unwrap();
        assert_eq!(intent.name, "Primary");
        assert_eq!(intent.reasoning(), Some("Primary: rule hit"));
    }

    #[test]
    fn primary_at_threshold_is_accepted() {
        let model = ChainedIntentModel::new(fixed("P", 0.7, None), fixed("F", 0.1, None), 0.7);
        let intent = model.infer(&BehaviorSpace::new(), None).unwrap();
        assert_eq!(intent.name, "P");
        assert!(intent.reasoning().unwrap().starts_with("Primary:"));
    }

    #[test]
    fn fallback_below_threshold() {
        let model = ChainedIntentModel::new(fixed("P", 0.2, None), fixed("F", 0.6, None), 0.8);
        let intent = model.infer(&BehaviorSpace::new(), None).unwrap();
        assert_eq!(intent.name, "F");
        assert_eq!(intent.reasoning(), Some("Fallback: primary confidence below 0.8"));
    }

    #[test]
    fn fallback_keeps_its_reasoning() {
        let model =
            ChainedIntentModel::new(fixed("P", 0.2, None), fixed("F", 0.6, Some("llm")), 0.8);
        let intent = model.infer(&BehaviorSpace::new(), None).unwrap();
        assert_eq!(intent.reasoning(), Some("Fallback: llm"));
    }

    #[test]
    fn threshold_is_clamped() {
        let model = ChainedIntentModel::new(fixed("P", 1.0, None), fixed("F", 0.0, None), 3.0);
        assert_eq!(model.threshold(), 1.0);
        assert_eq!(model.infer(&BehaviorSpace::new(), None).unwrap().name, "P");
    }
}
