use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use intentum_core::BehaviorSpace;

use super::{mean_score, SimilarityEngine, TimeAwareSimilarityEngine};
use crate::embedding::IntentEmbedding;

/// Default half-life: one hour.
pub const DEFAULT_HALF_LIFE_SECS: i64 = 3600;

/// Recency-weighted mean.
///
/// Each embedding's weight is `2^(-age / half_life)`, where `age` runs from
/// the most recent event with the embedding's source key (`actor:action`)
/// to the reference time. Events at or after the reference time weigh 1.0.
/// Embeddings whose source has no event are skipped.
///
/// Without a space the engine degrades to the plain mean.
#[derive(Debug, Clone, Copy)]
pub struct TimeDecaySimilarityEngine {
    half_life: Duration,
    reference: Option<DateTime<Utc>>,
}

impl Default for TimeDecaySimilarityEngine {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_HALF_LIFE_SECS))
    }
}

impl TimeDecaySimilarityEngine {
    /// Decay relative to the wall clock at each call.
    pub fn new(half_life: Duration) -> Self {
        Self {
            half_life,
            reference: None,
        }
    }

    /// Decay relative to a fixed instant.
    pub fn at(half_life: Duration, reference: DateTime<Utc>) -> Self {
        Self {
            half_life,
            reference: Some(reference),
        }
    }

    pub fn half_life(&self) -> Duration {
        self.half_life
    }

    /// Weight for an event of the given age. A non-positive half-life
    /// disables decay.
    pub fn decay_factor(&self, age: Duration) -> f64 {
        if age <= Duration::zero() {
            return 1.0;
        }
        let half_life_ms = self.half_life.num_milliseconds();
        if half_life_ms <= 0 {
            return 1.0;
        }
        let halvings = age.num_milliseconds() as f64 / half_life_ms as f64;
        2f64.powf(-halvings)
    }
}

impl SimilarityEngine for TimeDecaySimilarityEngine {
    fn calculate(&self, embeddings: &[IntentEmbedding]) -> f64 {
        mean_score(embeddings)
    }

    fn as_time_aware(&self) -> Option<&dyn TimeAwareSimilarityEngine> {
        Some(self)
    }
}

impl TimeAwareSimilarityEngine for TimeDecaySimilarityEngine {
    fn calculate_with_time_decay(
        &self,
        space: &BehaviorSpace,
        embeddings: &[IntentEmbedding],
    ) -> f64 {
        if embeddings.is_empty() || space.is_empty() {
            return 0.0;
        }

        let mut latest: HashMap<String, DateTime<Utc>> = HashMap::new();
        for event in space.events() {
            latest
                .entry(event.dimension_key())
                .and_modify(|t| *t = (*t).max(event.occurred_at()))
                .or_insert(event.occurred_at());
        }

        let reference = self.reference.unwrap_or_else(Utc::now);
        let (mut weighted, mut total) = (0.0, 0.0);
        for embedding in embeddings {
            let Some(at) = latest.get(&embedding.source) else {
                continue;
            };
            let factor = self.decay_factor(reference - *at);
            weighted += embedding.score * factor;
            total += factor;
        }

        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use intentum_core::BehaviorEvent;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn engine() -> TimeDecaySimilarityEngine {
        TimeDecaySimilarityEngine::at(Duration::seconds(100), t(1000))
    }

    #[test]
    fn event_at_reference_returns_raw_score() {
        let mut space = BehaviorSpace::new();
        space.observe(BehaviorEvent::new("user", "login", t(1000)));
        let embeddings = [IntentEmbedding::new("user:login", 0.42)];
        let score = engine().calculate_with_time_decay(&space, &embeddings);
        assert_eq!(score, 0.42);
    }

    #[test]
    fn older_events_weigh_less() {
        let mut space = BehaviorSpace::new();
        space.observe(BehaviorEvent::new("u", "old", t(800)));
        space.observe(BehaviorEvent::new("u", "new", t(1000)));
        let score = engine().calculate_with_time_decay(
            &space,
            &[IntentEmbedding::new("u:old", 1.0), IntentEmbedding::new("u:new", 0.0)],
        );
        // old weight 0.25, new weight 1.0
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn most_recent_timestamp_per_source_is_used() {
        let mut space = BehaviorSpace::new();
        space.observe(BehaviorEvent::new("u", "x", t(0)));
        space.observe(BehaviorEvent::new("u", "x", t(1000)));
        space.observe(BehaviorEvent::new("u", "y", t(900)));
        let score = engine().calculate_with_time_decay(
            &space,
            &[IntentEmbedding::new("u:x", 1.0), IntentEmbedding::new("u:y", 0.0)],
        );
        // x weight 1.0, y weight 0.5
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn unmatched_sources_are_ignored() {
        let mut space = BehaviorSpace::new();
        space.observe(BehaviorEvent::new("u", "x", t(1000)));
        let score = engine().calculate_with_time_decay(
            &space,
            &[IntentEmbedding::new("u:x", 0.3), IntentEmbedding::new("ghost:key", 1.0)],
        );
        assert_eq!(score, 0.3);
    }

    #[test]
    fn future_events_weigh_one() {
        assert_eq!(engine().decay_factor(Duration::seconds(-50)), 1.0);
        assert_eq!(engine().decay_factor(Duration::seconds(100)), 0.5);
    }

    #[test]
    fn empty_inputs_are_zero() {
        let mut space = BehaviorSpace::new();
        let embeddings = [IntentEmbedding::new("a:b", 1.0)];
        assert_eq!(engine().calculate_with_time_decay(&space, &embeddings), 0.0);
        space.observe(BehaviorEvent::new("a", "b", t(0)));
        assert_eq!(engine().calculate_with_time_decay(&space, &[]), 0.0);
    }

    #[test]
    fn non_time_path_is_plain_mean() {
        let s =
            engine().calculate(&[IntentEmbedding::new("a", 0.2), IntentEmbedding::new("b", 0.4)]);
        assert!((s - 0.3).abs() < 1e-12);
        assert!(engine().as_time_aware().is_some());
    }

    #[test]
    fn default_half_life_is_one_hour() {
        assert_eq!(TimeDecaySimilarityEngine::default().half_life(), Duration::hours(1));
    }
}
