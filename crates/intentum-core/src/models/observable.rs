//! # Observable Model
//!
//! Wraps a model with an `intentum.infer` tracing span and `metrics` facade instruments.
//! Instrumentation is a side channel: results and errors from the inner
//! model are returned unchanged.
//!
//! ## Instruments
//!
//! | Name | Kind | Labels |
//! |------|------|--------|
//! | `intentum_intent_inference_total` | counter | `intent`, `confidence_level`, `outcome` |
//! | `intentum_intent_inference_duration_ms` | histogram | none |
//! | `intentum_intent_confidence_score` | histogram | none |
//! | `intentum_behavior_space_size` | histogram | none |
//!
//! No recorder is installed here; without one the macros are no-ops.

use std::time::Instant;

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::error::InferenceError;
use crate::intent::Intent;
use crate::model::IntentModel;

/// Instrumented pass-through wrapper.
pub struct ObservableIntentModel<M> {
    inner: M,
}

impl<M: IntentModel> ObservableIntentModel<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: IntentModel> IntentModel for ObservableIntentModel<M> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let span = tracing::info_span!(
            "intentum.infer",
            intent.name = tracing::field::Empty,
            intent.confidence.level = tracing::field::Empty,
            intent.signal.count = tracing::field::Empty,
            behavior.event.count = space.len(),
        );
        let _entered = span.enter();
        let started = Instant::now();

        let result = self.inner.infer(space, precomputed);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(intent) => {
                span.record("intent.name", intent.name.as_str());
                span.record("intent.confidence.level", intent.level().as_str());
                span.record("intent.signal.count", intent.signals.len());
                metrics::counter!(
                    "intentum_intent_inference_total",
                    "intent" => intent.name.clone(),
                    "confidence_level" => intent.level().as_str(),
                    "outcome" => "ok"
                )
                .increment(1);
                metrics::histogram!("intentum_intent_confidence_score").record(intent.score());
            }
            Err(e) => {
                tracing::warn!(error = %e, "inference failed");
                metrics::counter!("intentum_intent_inference_total", "outcome" => "error")
                    .increment(1);
            }
        }
        metrics::histogram!("intentum_intent_inference_duration_ms").record(elapsed_ms);
        metrics::histogram!("intentum_behavior_space_size").record(space.len() as f64);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorEvent;
    use crate::error::{EmbeddingFailure, ProviderFailureKind};
    use crate::models::rule_based::{RuleBasedIntentModel, RuleMatch};

    struct Failing;

    impl IntentModel for Failing {
        fn infer(
            &self,
            _: &BehaviorSpace,
            _: Option<&BehaviorVector>,
        ) -> Result<Intent, InferenceError> {
            Err(EmbeddingFailure::new("mock", ProviderFailureKind::Timeout, "slow").into())
        }
    }

    #[test]
    fn forwards_result_unchanged() {
        let inner = RuleBasedIntentModel::empty().rule(|_| Some(RuleMatch::new("A", 0.6)));
        let mut space = BehaviorSpace::new();
        space.observe(BehaviorEvent::now("u", "x"));
        let direct = inner.infer(&space, None).unwrap();
        let observed = ObservableIntentModel::new(inner).infer(&space, None).unwrap();
        assert_eq!(direct, observed);
    }

    #[test]
    fn propagates_errors() {
        let err = ObservableIntentModel::new(Failing)
            .infer(&BehaviorSpace::new(), None)
            .unwrap_err();
        match err {
            InferenceError::Provider(f) => assert_eq!(f.kind, ProviderFailureKind::Timeout),
            other => panic!("unexpected error: {other}"),
        }
    }
}
