//! Ordered, first-match rule evaluation.

use std::sync::Arc;

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::confidence::{ConfidenceCalculator, DefaultConfidenceCalculator};
use crate::error::InferenceError;
use crate::intent::{Intent, IntentSignal, UNKNOWN_INTENT};
use crate::model::{resolve_vector, IntentModel};

/// Signal source used by rule-based intents.
pub const RULE_SIGNAL_SOURCE: &str = "rule";

/// Reasoning attached to the `Unknown` intent.
pub const NO_RULE_MATCHED: &str = "No rule matched";

/// The result of a rule that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub name: String,
    pub score: f64,
    pub reasoning: Option<String>,
}

impl RuleMatch {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// A pure rule over a space.
pub type IntentRule = Box<dyn Fn(&BehaviorSpace) -> Option<RuleMatch> + Send + Sync>;

/// Evaluates rules in order; the first match wins.
///
/// Every result, matched or `Unknown`, carries one signal per vector
/// dimension. Rule scores are clamped into `[0, 1]`.
pub struct RuleBasedIntentModel {
    rules: Vec<IntentRule>,
    calculator: Arc<dyn ConfidenceCalculator>,
}

impl std::fmt::Debug for RuleBasedIntentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleBasedIntentModel")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl RuleBasedIntentModel {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self {
            rules,
            calculator: Arc::new(DefaultConfidenceCalculator),
        }
    }

    /// Start with no rules and add them with [`RuleBasedIntentModel::rule`].
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append a rule.
    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&BehaviorSpace) -> Option<RuleMatch> + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Replace the confidence calculator.
    pub fn with_calculator(mut self, calculator: Arc<dyn ConfidenceCalculator>) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn signals(vector: &BehaviorVector) -> Vec<IntentSignal> {
        IntentSignal::from_vector(RULE_SIGNAL_SOURCE, vector)
    }
}

impl IntentModel for RuleBasedIntentModel {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let vector = resolve_vector(space, precomputed);

        if let Some(matched) = self.rules.iter().find_map(|rule| rule(space)) {
            tracing::debug!(intent = %matched.name, score = matched.score, "rule matched");
            return Ok(Intent {
                name: matched.name,
                signals: Self::signals(vector),
                confidence: self.calculator.from_score(matched.score),
                reasoning: matched.reasoning,
            });
        }

        Ok(Intent {
            name: UNKNOWN_INTENT.to_string(),
            signals: Self::signals(vector),
            confidence: self.calculator.from_score(0.0),
            reasoning: Some(NO_RULE_MATCHED.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorEvent;
    use crate::confidence::{ConfidenceLevel, FixedConfidenceCalculator, IntentConfidence};
    use std::collections::BTreeMap;

    fn space(actions: &[&str]) -> BehaviorSpace {
        let mut s = BehaviorSpace::new();
        for a in actions {
            s.observe(BehaviorEvent::now("user", *a));
        }
        s
    }

    fn has_action(action: &'static str) -> impl Fn(&BehaviorSpace) -> bool {
        move |s: &BehaviorSpace| s.events().iter().any(|e| e.action() == action)
    }

    #[test]
    fn first_matching_rule_wins() {
        let login = has_action("login");
        let model = RuleBasedIntentModel::empty()
            .rule(move |s| login(s).then(|| RuleMatch::new("First", 0.9)))
            .rule(|_| Some(RuleMatch::new("Second", 0.5)));
        let intent = model.infer(&space(&["login"]), None).unwrap();
        assert_eq!(intent.name, "First");
        assert_eq!(intent.level(), ConfidenceLevel::Certain);
    }

    #[test]
    fn unknown_when_nothing_matches() {
        let model = RuleBasedIntentModel::empty().rule(|_| None);
        let intent = model.infer(&space(&["login", "login"]), None).unwrap();
        assert_eq!(intent.name, UNKNOWN_INTENT);
        assert_eq!(intent.score(), 0.0);
        assert_eq!(intent.reasoning(), Some(NO_RULE_MATCHED));
        assert_eq!(intent.signals.len(), 1);
        assert_eq!(intent.signals[0].weight, 2.0);
    }

    #[test]
    fn signals_cover_every_dimension() {
        let model = RuleBasedIntentModel::empty().rule(|_| Some(RuleMatch::new("Any", 0.5)));
        let intent = model.infer(&space(&["a", "b", "c"]), None).unwrap();
        assert_eq!(intent.signals.len(), 3);
        assert!(intent.signals.iter().all(|s| s.source == RULE_SIGNAL_SOURCE));
    }

    #[test]
    fn score_is_clamped_and_reasoning_kept() {
        let model = RuleBasedIntentModel::empty()
            .rule(|_| Some(RuleMatch::new("Over", 4.0).with_reasoning("why")));
        let intent = model.infer(&space(&["a"]), None).unwrap();
        assert_eq!(intent.score(), 1.0);
        assert_eq!(intent.reasoning(), Some("why"));
    }

    #[test]
    fn precomputed_vector_is_used_for_signals() {
        let mut dims = BTreeMap::new();
        dims.insert("pre:computed".to_string(), 7.0);
        let pre = BehaviorVector::from_dimensions(dims);
        let model = RuleBasedIntentModel::empty();
        let s = space(&["a"]);
        let intent = model.infer(&s, Some(&pre)).unwrap();
        assert_eq!(intent.signals[0].description, "pre:computed");
        assert!(!s.is_vector_cached());
    }

    #[test]
    fn custom_calculator_is_used() {
        let fixed =
            FixedConfidenceCalculator::new(IntentConfidence::new(0.5, ConfidenceLevel::Medium));
        let model = RuleBasedIntentModel::empty()
            .rule(|_| Some(RuleMatch::new("X", 0.99)))
            .with_calculator(Arc::new(fixed));
        let intent = model.infer(&space(&["a"]), None).unwrap();
        assert_eq!(intent.level(), ConfidenceLevel::Medium);
    }

    #[test]
    fn empty_space_yields_no_signals() {
        let intent = RuleBasedIntentModel::empty()
            .infer(&BehaviorSpace::new(), None)
            .unwrap();
        assert!(intent.signals.is_empty());
        assert_eq!(intent.name, UNKNOWN_INTENT);
    }
}
