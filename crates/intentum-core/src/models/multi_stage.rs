//! Ordered stages, each with its own acceptance threshold.

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::confidence::clamp_score;
use crate::error::{ConfigurationError, InferenceError};
use crate::intent::Intent;
use crate::model::IntentModel;

/// One stage: a model and the score its result must reach.
pub struct Stage {
    model: Box<dyn IntentModel>,
    threshold: f64,
}

impl Stage {
    pub fn new(model: impl IntentModel + 'static, threshold: f64) -> Self {
        Self {
            model: Box::new(model),
            threshold: clamp_score(threshold),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Returns the first stage result that meets its threshold, unmodified.
///
/// When no stage qualifies, the last stage's result is returned with its
/// reasoning annotated as a last-stage fallback. Later stages are not run
/// once an earlier one qualifies.
pub struct MultiStageIntentModel {
    stages: Vec<Stage>,
}

impl std::fmt::Debug for MultiStageIntentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let thresholds: Vec<f64> = self.stages.iter().map(|s| s.threshold).collect();
        f.debug_struct("MultiStageIntentModel")
            .field("thresholds", &thresholds)
            .finish()
    }
}

impl MultiStageIntentModel {
    /// # Errors
    ///
    /// [`ConfigurationError::EmptyStages`] if `stages` is empty.
    pub fn new(stages: Vec<Stage>) -> Result<Self, ConfigurationError> {
        if stages.is_empty() {
            return Err(ConfigurationError::EmptyStages);
        }
        Ok(Self { stages })
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl IntentModel for MultiStageIntentModel {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let mut last = None;
        for (index, stage) in self.stages.iter().enumerate() {
            let intent = stage.model.infer(space, precomputed)?;
            if intent.score() >= stage.threshold {
                tracing::debug!(stage = index, intent = %intent.name, "stage accepted");
                return Ok(intent);
            }
            last = Some(intent);
        }

        let mut intent = last.ok_or(ConfigurationError::EmptyStages)?;
        tracing::debug!(intent = %intent.name, "multi-stage fell through to last stage");
        let reasoning = match intent.reasoning.take() {
            Some(r) => format!("{r} (multi-stage: last stage, no threshold met)"),
            None => "Multi-stage: last stage (no threshold met)".to_string(),
        };
        Ok(intent.with_reasoning(reasoning))
    }
}
