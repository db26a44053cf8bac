//! # Intent
//!
//! The named classification an inference model produces: a name, the
//! signals that contributed to it, a confidence, and optional free-text
//! reasoning for debugging and audit. Reasoning is never parsed by the
//! policy layer.

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorVector;
use crate::confidence::{ConfidenceLevel, IntentConfidence};

/// Name of the intent returned when no rule matched.
pub const UNKNOWN_INTENT: &str = "Unknown";

/// One contributing factor to an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSignal {
    pub source: String,
    pub description: String,
    /// Non-negative; negative inputs are clamped to zero.
    pub weight: f64,
}

impl IntentSignal {
    pub fn new(source: impl Into<String>, description: impl Into<String>, weight: f64) -> Self {
        let weight = if weight.is_nan() { 0.0 } else { weight.max(0.0) };
        Self {
            source: source.into(),
            description: description.into(),
            weight,
        }
    }

    /// One signal per vector dimension, in key order.
    pub fn from_vector(source: &str, vector: &BehaviorVector) -> Vec<Self> {
        vector
            .iter()
            .map(|(key, value)| Self::new(source, key, value))
            .collect()
    }
}

/// An inferred intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub signals: Vec<IntentSignal>,
    pub confidence: IntentConfidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Intent {
    pub fn new(
        name: impl Into<String>,
        signals: Vec<IntentSignal>,
        confidence: IntentConfidence,
    ) -> Self {
        Self {
            name: name.into(),
            signals,
            confidence,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn score(&self) -> f64 {
        self.confidence.score()
    }

    pub fn level(&self) -> ConfidenceLevel {
        self.confidence.level()
    }

    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }
}
