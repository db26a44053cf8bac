//! # Evaluation Context
//!
//! [`PolicyContext`] carries what an intent alone cannot tell a rule: how
//! loaded the system is, where the request came from, what the actor did
//! recently, and any caller-defined values. [`ContextAwareIntentPolicy`]
//! holds rules that read it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use intentum_core::{ConfidenceLevel, Intent, MetadataValue};

use crate::decision::PolicyDecision;
use crate::error::RuleError;
use crate::rule::{first_match, ContextPolicyRule, PolicyRule, RuleEvaluation};

/// A compact record of a previously inferred intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub name: String,
    pub confidence_level: ConfidenceLevel,
    pub confidence_score: f64,
}

impl From<&Intent> for IntentSummary {
    fn from(intent: &Intent) -> Self {
        Self {
            name: intent.name.clone(),
            confidence_level: intent.level(),
            confidence_score: intent.score(),
        }
    }
}

/// Inputs to context-aware rules beyond the intent itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyContext {
    /// Load in `[0, 1]`, when known.
    pub system_load: Option<f64>,
    pub region: Option<String>,
    /// Most recent last. Bounded by the caller.
    pub recent_intents: Vec<IntentSummary>,
    pub custom: BTreeMap<String, MetadataValue>,
}

impl PolicyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_load(mut self, load: f64) -> Self {
        self.system_load = Some(load);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_recent_intents(mut self, recent: Vec<IntentSummary>) -> Self {
        self.recent_intents = recent;
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Append to the history, dropping the oldest entries beyond `max_len`.
    pub fn push_recent(&mut self, summary: IntentSummary, max_len: usize) {
        self.recent_intents.push(summary);
        if self.recent_intents.len() > max_len {
            let excess = self.recent_intents.len() - max_len;
            self.recent_intents.drain(..excess);
        }
    }

    /// How many recent intents carry `name` (ASCII case-insensitive).
    pub fn recent_count(&self, name: &str) -> usize {
        self.recent_intents
            .iter()
            .filter(|s| s.name.eq_ignore_ascii_case(name))
            .count()
    }

    /// System load, or [`RuleError::MissingContext`] for rules that need it.
    pub fn require_system_load(&self) -> Result<f64, RuleError> {
        self.system_load.ok_or(RuleError::MissingContext("system_load"))
    }

    pub fn require_region(&self) -> Result<&str, RuleError> {
        self.region.as_deref().ok_or(RuleError::MissingContext("region"))
    }
}

// ---------------------------------------------------------------------------
// ContextAwareIntentPolicy
// ---------------------------------------------------------------------------

/// Ordered rules over `(Intent, PolicyContext)`.
#[derive(Debug, Clone, Default)]
pub struct ContextAwareIntentPolicy {
    rules: Vec<ContextPolicyRule>,
}

impl ContextAwareIntentPolicy {
    pub fn new(rules: Vec<ContextPolicyRule>) -> Self {
        Self { rules }
    }

    pub fn builder() -> ContextAwareIntentPolicyBuilder {
        ContextAwareIntentPolicyBuilder::default()
    }

    pub fn rules(&self) -> &[ContextPolicyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(
        &self,
        intent: &Intent,
        context: &PolicyContext,
    ) -> RuleEvaluation<'_, ContextPolicyRule> {
        first_match(
            &self.rules,
            ContextPolicyRule::name,
            ContextPolicyRule::decision,
            |rule| rule.matches(intent, context),
        )
    }
}

#[derive(Debug, Default)]
pub struct ContextAwareIntentPolicyBuilder {
    rules: Vec<ContextPolicyRule>,
}

impl ContextAwareIntentPolicyBuilder {
    pub fn rule<F>(
        mut self,
        name: impl Into<String>,
        decision: PolicyDecision,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Intent, &PolicyContext) -> bool + Send + Sync + 'static,
    {
        self.rules.push(ContextPolicyRule::new(name, decision, predicate));
        self
    }

    pub fn fallible_rule<F>(
        mut self,
        name: impl Into<String>,
        decision: PolicyDecision,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Intent, &PolicyContext) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        self.rules.push(ContextPolicyRule::fallible(name, decision, predicate));
        self
    }

    /// Add an intent-only rule that ignores the context.
    pub fn intent_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(ContextPolicyRule::from_rule(rule));
        self
    }

    pub fn build(self) -> ContextAwareIntentPolicy {
        ContextAwareIntentPolicy { rules: self.rules }
    }
}
