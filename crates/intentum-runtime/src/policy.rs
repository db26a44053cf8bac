//! # Intent Policies
//!
//! An [`IntentPolicy`] is an ordered list of [`PolicyRule`]s. The first rule
//! whose predicate holds decides; a policy with no rules, or one where no
//! rule matches, decides [`PolicyDecision::Observe`].
//!
//! ## Composition
//!
//! - [`IntentPolicy::with_base`] puts a base policy's rules ahead of the
//!   derived policy's, so the base always gets first refusal.
//! - [`IntentPolicy::merge`] concatenates policies in the order given.
//!
//! Rules share their predicates through `Arc`, so composing policies never
//! clones closures.

use intentum_core::Intent;

use crate::decision::PolicyDecision;
use crate::error::RuleError;
use crate::rule::{first_match, PolicyRule, RuleEvaluation};

/// Ordered, first-match policy over intents.
#[derive(Debug, Clone, Default)]
pub struct IntentPolicy {
    rules: Vec<PolicyRule>,
}

impl IntentPolicy {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    pub fn builder() -> IntentPolicyBuilder {
        IntentPolicyBuilder::default()
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a rule after the existing ones.
    pub fn add_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// A new policy evaluating `base`'s rules first, then this policy's.
    pub fn with_base(&self, base: &IntentPolicy) -> IntentPolicy {
        Self::merge([base, self])
    }

    /// Concatenate rule lists in iteration order. No policies yields an
    /// empty policy.
    pub fn merge<'a>(policies: impl IntoIterator<Item = &'a IntentPolicy>) -> IntentPolicy {
        let rules = policies
            .into_iter()
            .flat_map(|p| p.rules.iter().cloned())
            .collect();
        IntentPolicy { rules }
    }

    pub fn evaluate(&self, intent: &Intent) -> RuleEvaluation<'_, PolicyRule> {
        first_match(&self.rules, PolicyRule::name, PolicyRule::decision, |rule| {
            rule.matches(intent)
        })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent construction of an [`IntentPolicy`], one method per decision.
///
/// ```
/// use intentum_runtime::{IntentPolicy, PolicyDecision};
/// use intentum_core::ConfidenceLevel;
///
/// let policy = IntentPolicy::builder()
///     .block("low-confidence", |i| i.level() <= ConfidenceLevel::Low)
///     .allow("default", |_| true)
///     .build();
/// assert_eq!(policy.len(), 2);
/// assert_eq!(policy.rules()[0].decision(), PolicyDecision::Block);
/// ```
#[derive(Debug, Default)]
pub struct IntentPolicyBuilder {
    rules: Vec<PolicyRule>,
}

macro_rules! decision_methods {
    ($($method:ident => $decision:ident),* $(,)?) => {
        $(
            pub fn $method<F>(self, name: impl Into<String>, predicate: F) -> Self
            where
                F: Fn(&Intent) -> bool + Send + Sync + 'static,
            {
                self.rule(name, PolicyDecision::$decision, predicate)
            }
        )*
    };
}

impl IntentPolicyBuilder {
    decision_methods! {
        allow => Allow,
        observe => Observe,
        warn => Warn,
        block => Block,
        escalate => Escalate,
        require_auth => RequireAuth,
        rate_limit => RateLimit,
    }

    pub fn rule<F>(
        mut self,
        name: impl Into<String>,
        decision: PolicyDecision,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Intent) -> bool + Send + Sync + 'static,
    {
        self.rules.push(PolicyRule::new(name, decision, predicate));
        self
    }

    pub fn fallible_rule<F>(
        mut self,
        name: impl Into<String>,
        decision: PolicyDecision,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Intent) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        self.rules.push(PolicyRule::fallible(name, decision, predicate));
        self
    }

    pub fn push(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> IntentPolicy {
        IntentPolicy { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intentum_core::{ConfidenceLevel, IntentConfidence};

    fn intent(score: f64) -> Intent {
        Intent::new("purchase", vec![], IntentConfidence::from_score(score))
    }

    fn names(policy: &IntentPolicy) -> Vec<&str> {
        policy.rules().iter().map(PolicyRule::name).collect()
    }

    #[test]
    fn empty_policy_observes() {
        let policy = IntentPolicy::default();
        let eval = policy.evaluate(&intent(0.99));
        assert_eq!(eval.decision, PolicyDecision::Observe);
    }

    #[test]
    fn earlier_rule_wins_over_later() {
        let policy = IntentPolicy::builder()
            .warn("first", |_| true)
            .block("second", |_| true)
            .build();
        assert_eq!(policy.evaluate(&intent(0.5)).decision, PolicyDecision::Warn);
    }

    #[test]
    fn builder_methods_map_to_decisions() {
        let policy = IntentPolicy::builder()
            .allow("a", |_| false)
            .observe("o", |_| false)
            .warn("w", |_| false)
            .block("b", |_| false)
            .escalate("e", |_| false)
            .require_auth("r", |_| false)
            .rate_limit("l", |_| false)
            .build();
        let decisions: Vec<_> = policy.rules().iter().map(PolicyRule::decision).collect();
        assert_eq!(decisions, PolicyDecision::all());
    }

    #[test]
    fn base_rules_come_first() {
        let base = IntentPolicy::builder()
            .block("base-low", |i| i.level() == ConfidenceLevel::Low)
            .build();
        let derived = IntentPolicy::builder()
            .allow("derived-low", |i| i.level() == ConfidenceLevel::Low)
            .build();
        let composed = derived.with_base(&base);
        assert_eq!(names(&composed), vec!["base-low", "derived-low"]);
        assert_eq!(composed.evaluate(&intent(0.1)).decision, PolicyDecision::Block);
        assert_eq!(derived.len(), 1);
    }

    #[test]
    fn merge_concatenates_in_order() {
        let a = IntentPolicy::builder().allow("a", |_| true).build();
        let b = IntentPolicy::builder().block("b1", |_| true).block("b2", |_| true).build();
        assert_eq!(names(&IntentPolicy::merge([&a, &b])), vec!["a", "b1", "b2"]);
        assert_eq!(names(&IntentPolicy::merge([&b, &a])), vec!["b1", "b2", "a"]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let merged = IntentPolicy::merge(std::iter::empty());
        assert!(merged.is_empty());
        assert_eq!(merged.evaluate(&intent(0.9)).decision, PolicyDecision::Observe);
    }

    #[test]
    fn merge_of_one_behaves_like_itself() {
        let p = IntentPolicy::builder()
            .block("low", |i| i.score() < 0.3)
            .allow("rest", |_| true)
            .build();
        let merged = IntentPolicy::merge([&p]);
        for score in [0.0, 0.29, 0.3, 0.7, 1.0] {
            assert_eq!(
                merged.evaluate(&intent(score)).decision,
                p.evaluate(&intent(score)).decision
            );
        }
    }
}
