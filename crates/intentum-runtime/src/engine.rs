//! # Policy Engine
//!
//! Turns an [`Intent`] into a [`PolicyDecision`]. The engine holds no policy
//! state of its own: every call names the policy to evaluate, so one engine
//! serves any number of policies and is safe to share across threads.
//!
//! ## Failure Handling
//!
//! Callers always receive a decision. When a rule predicate fails the
//! evaluation stops with [`PolicyDecision::Observe`], a warning is logged,
//! and, if the engine has an [`ExecutionLog`], a record with
//! `success = false` and the error's message and trace is appended.
//!
//! ## Instrumentation
//!
//! Every decision increments `intentum_policy_decision_total{decision}`.

use std::sync::Arc;
use std::time::Instant;

use intentum_core::Intent;

use crate::config::{RateLimitOptions, RuntimeConfig};
use crate::context::{ContextAwareIntentPolicy, PolicyContext};
use crate::decision::PolicyDecision;
use crate::execution::{ExecutionLog, PolicyExecutionRecord};
use crate::policy::IntentPolicy;
use crate::rate_limit::{RateLimitResult, RateLimiter};
use crate::rule::{ContextPolicyRule, PolicyRule, RuleEvaluation};
use crate::variants::PolicyVariantSet;

#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    execution_log: Option<Arc<ExecutionLog>>,
}

impl PolicyEngine {
    /// An engine without an execution log.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine appending one record per evaluation to `log`.
    pub fn with_execution_log(log: Arc<ExecutionLog>) -> Self {
        Self {
            execution_log: Some(log),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        if config.execution_log_enabled {
            Self::with_execution_log(Arc::new(ExecutionLog::default()))
        } else {
            Self::new()
        }
    }

    pub fn execution_log(&self) -> Option<&ExecutionLog> {
        self.execution_log.as_deref()
    }

    // -----------------------------------------------------------------------
    // Intent-only policies
    // -----------------------------------------------------------------------

    pub fn decide(&self, intent: &Intent, policy: &IntentPolicy) -> PolicyDecision {
        self.decide_with_rule(intent, policy).0
    }

    /// The decision and the rule that produced it. `None` when no rule
    /// matched or a rule failed.
    pub fn decide_with_rule<'p>(
        &self,
        intent: &Intent,
        policy: &'p IntentPolicy,
    ) -> (PolicyDecision, Option<&'p PolicyRule>) {
        let (evaluation, _) = self.run(intent, PolicyRule::name, || policy.evaluate(intent));
        (evaluation.decision, evaluation.matched)
    }

    /// The decision plus a full execution record, whether or not the engine
    /// keeps a log.
    pub fn decide_with_execution_record(
        &self,
        intent: &Intent,
        policy: &IntentPolicy,
    ) -> (PolicyDecision, PolicyExecutionRecord) {
        let (evaluation, record) = self.run(intent, PolicyRule::name, || policy.evaluate(intent));
        (evaluation.decision, record)
    }

    /// Decide, then consult `limiter` only when the decision is
    /// [`PolicyDecision::RateLimit`]. The decision itself is never altered.
    pub fn decide_with_rate_limit(
        &self,
        intent: &Intent,
        policy: &IntentPolicy,
        limiter: &dyn RateLimiter,
        options: &RateLimitOptions,
    ) -> (PolicyDecision, Option<RateLimitResult>) {
        let decision = self.decide(intent, policy);
        if decision != PolicyDecision::RateLimit {
            return (decision, None);
        }
        let result = limiter.try_acquire(&options.key, options.limit, options.window);
        tracing::debug!(
            intent = %intent.name,
            key = %options.key,
            allowed = result.allowed,
            count = result.current_count,
            "rate limit consulted"
        );
        (decision, Some(result))
    }

    /// Evaluate the policy of the variant selected for `intent`.
    pub fn decide_variant(&self, intent: &Intent, variants: &PolicyVariantSet) -> PolicyDecision {
        match variants.policy_for(intent) {
            Some((variant, policy)) => {
                tracing::debug!(intent = %intent.name, %variant, "policy variant selected");
                self.decide(intent, policy)
            }
            None => {
                tracing::debug!(intent = %intent.name, "no policy variant registered");
                record_decision(PolicyDecision::Observe);
                PolicyDecision::Observe
            }
        }
    }

    // -----------------------------------------------------------------------
    // Context-aware policies
    // -----------------------------------------------------------------------

    pub fn decide_with_context(
        &self,
        intent: &Intent,
        context: &PolicyContext,
        policy: &ContextAwareIntentPolicy,
    ) -> PolicyDecision {
        self.decide_with_context_rule(intent, context, policy).0
    }

    pub fn decide_with_context_rule<'p>(
        &self,
        intent: &Intent,
        context: &PolicyContext,
        policy: &'p ContextAwareIntentPolicy,
    ) -> (PolicyDecision, Option<&'p ContextPolicyRule>) {
        let (evaluation, _) = self.run(intent, ContextPolicyRule::name, || {
            policy.evaluate(intent, context)
        });
        (evaluation.decision, evaluation.matched)
    }

    // -----------------------------------------------------------------------
    // Shared path
    // -----------------------------------------------------------------------

    fn run<'p, R>(
        &self,
        intent: &Intent,
        rule_name: impl Fn(&R) -> &str,
        evaluate: impl FnOnce() -> RuleEvaluation<'p, R>,
    ) -> (RuleEvaluation<'p, R>, PolicyExecutionRecord) {
        let started = Instant::now();
        let evaluation = evaluate();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let record = match &evaluation.failure {
            Some(failure) => {
                tracing::warn!(
                    intent = %intent.name,
                    rule = %failure.rule,
                    error = %failure.error,
                    "policy rule failed, deciding Observe"
                );
                PolicyExecutionRecord::failed(
                    &intent.name,
                    evaluation.decision,
                    duration_ms,
                    &failure.error,
                )
            }
            None => {
                let matched = evaluation.matched.map(|r| rule_name(r).to_string());
                tracing::debug!(
                    intent = %intent.name,
                    rule = matched.as_deref().unwrap_or("-"),
                    decision = %evaluation.decision,
                    "policy decided"
                );
                PolicyExecutionRecord::succeeded(
                    &intent.name,
                    matched,
                    evaluation.decision,
                    duration_ms,
                )
            }
        };

        record_decision(evaluation.decision);
        if let Some(log) = &self.execution_log {
            log.append(record.clone());
        }
        (evaluation, record)
    }
}

fn record_decision(decision: PolicyDecision) {
    metrics::counter!("intentum_policy_decision_total", "decision" => decision.as_str())
        .increment(1);
}
