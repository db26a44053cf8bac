//! # Policy Rules
//!
//! A rule is a name, a [`PolicyDecision`], and a predicate. Predicates are
//! plain closures with no captured mutable state, so evaluation order is the
//! only thing that determines which rule wins.
//!
//! Two shapes exist: [`PolicyRule`] sees only the [`Intent`];
//! [`ContextPolicyRule`] also sees a [`PolicyContext`]. Either can be built
//! from an infallible `Fn -> bool` or a fallible `Fn -> Result<bool, RuleError>`.
//!
//! ## First Match
//!
//! [`first_match`] walks rules in order and stops at the first predicate
//! that returns `true` or `Err`. An error ends evaluation with
//! [`PolicyDecision::Observe`]; later rules are not consulted.

use std::sync::Arc;

use intentum_core::Intent;

use crate::context::PolicyContext;
use crate::decision::PolicyDecision;
use crate::error::RuleError;

type IntentPredicate = Arc<dyn Fn(&Intent) -> Result<bool, RuleError> + Send + Sync>;
type ContextPredicate =
    Arc<dyn Fn(&Intent, &PolicyContext) -> Result<bool, RuleError> + Send + Sync>;

// ---------------------------------------------------------------------------
// PolicyRule
// ---------------------------------------------------------------------------

/// A rule over an intent alone.
#[derive(Clone)]
pub struct PolicyRule {
    name: String,
    decision: PolicyDecision,
    predicate: IntentPredicate,
}

impl std::fmt::Debug for PolicyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRule")
            .field("name", &self.name)
            .field("decision", &self.decision)
            .finish_non_exhaustive()
    }
}

impl PolicyRule {
    pub fn new<F>(name: impl Into<String>, decision: PolicyDecision, predicate: F) -> Self
    where
        F: Fn(&Intent) -> bool + Send + Sync + 'static,
    {
        Self::fallible(name, decision, move |intent| Ok(predicate(intent)))
    }

    /// A rule whose predicate may fail.
    pub fn fallible<F>(name: impl Into<String>, decision: PolicyDecision, predicate: F) -> Self
    where
        F: Fn(&Intent) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            decision,
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decision(&self) -> PolicyDecision {
        self.decision
    }

    pub fn matches(&self, intent: &Intent) -> Result<bool, RuleError> {
        (self.predicate)(intent)
    }
}

// ---------------------------------------------------------------------------
// ContextPolicyRule
// ---------------------------------------------------------------------------

/// A rule over an intent and its evaluation context.
#[derive(Clone)]
pub struct ContextPolicyRule {
    name: String,
    decision: PolicyDecision,
    predicate: ContextPredicate,
}

impl std::fmt::Debug for ContextPolicyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPolicyRule")
            .field("name", &self.name)
            .field("decision", &self.decision)
            .finish_non_exhaustive()
    }
}

impl ContextPolicyRule {
    pub fn new<F>(name: impl Into<String>, decision: PolicyDecision, predicate: F) -> Self
    where
        F: Fn(&Intent, &PolicyContext) -> bool + Send + Sync + 'static,
    {
        Self::fallible(name, decision, move |intent, ctx| Ok(predicate(intent, ctx)))
    }

    pub fn fallible<F>(name: impl Into<String>, decision: PolicyDecision, predicate: F) -> Self
    where
        F: Fn(&Intent, &PolicyContext) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            decision,
            predicate: Arc::new(predicate),
        }
    }

    /// Lift an intent-only rule; the context is ignored.
    pub fn from_rule(rule: PolicyRule) -> Self {
        let PolicyRule {
            name,
            decision,
            predicate,
        } = rule;
        Self {
            name,
            decision,
            predicate: Arc::new(move |intent: &Intent, _: &PolicyContext| predicate(intent)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decision(&self) -> PolicyDecision {
        self.decision
    }

    pub fn matches(&self, intent: &Intent, context: &PolicyContext) -> Result<bool, RuleError> {
        (self.predicate)(intent, context)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// A predicate failure, tagged with the rule that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub rule: String,
    pub error: RuleError,
}

/// Outcome of walking one policy's rules.
#[derive(Debug)]
pub struct RuleEvaluation<'p, R> {
    pub decision: PolicyDecision,
    /// The first matching rule, if any.
    pub matched: Option<&'p R>,
    /// Set when a predicate failed; `decision` is then `Observe`.
    pub failure: Option<RuleFailure>,
}

impl<R> RuleEvaluation<'_, R> {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Walk `rules` in order; the first predicate to return `true` decides.
pub(crate) fn first_match<'p, R>(
    rules: &'p [R],
    name: impl Fn(&R) -> &str,
    decision: impl Fn(&R) -> PolicyDecision,
    mut test: impl FnMut(&R) -> Result<bool, RuleError>,
) -> RuleEvaluation<'p, R> {
    for rule in rules {
        match test(rule) {
            Ok(true) => {
                return RuleEvaluation {
                    decision: decision(rule),
                    matched: Some(rule),
                    failure: None,
                }
            }
            Ok(false) => {}
            Err(error) => {
                return RuleEvaluation {
                    decision: PolicyDecision::Observe,
                    matched: None,
                    failure: Some(RuleFailure {
                        rule: name(rule).to_string(),
                        error,
                    }),
                }
            }
        }
    }
    RuleEvaluation {
        decision: PolicyDecision::Observe,
        matched: None,
        failure: None,
    }
}
