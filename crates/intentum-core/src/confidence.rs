//! # Confidence
//!
//! Maps a continuous score in `[0, 1]` to a discrete [`ConfidenceLevel`].
//!
//! ## Default Thresholds
//!
//! | Score | Level |
//! |-------|-------|
//! | `< 0.3` | Low |
//! | `[0.3, 0.6)` | Medium |
//! | `[0.6, 0.85)` | High |
//! | `>= 0.85` | Certain |
//!
//! `None` is never produced by a calculator; it exists only for confidences
//! constructed explicitly via [`IntentConfidence::none`].
//!
//! Calculators are pure: no hidden state, same input same output. Models
//! accept any [`ConfidenceCalculator`], so custom thresholds or a constant
//! calculator can be swapped in.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Discrete confidence bucket, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    None,
    Low,
    Medium,
    High,
    Certain,
}

impl ConfidenceLevel {
    /// All levels, weakest first.
    pub fn all() -> &'static [ConfidenceLevel] {
        &[
            Self::None,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::Certain,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Certain => "Certain",
        }
    }

    /// Parse a level name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A score in `[0, 1]` together with its level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentConfidence {
    score: f64,
    level: ConfidenceLevel,
}

impl IntentConfidence {
    /// Confidence from a score using the default thresholds.
    ///
    /// The score is clamped into `[0, 1]`; NaN becomes 0.
    pub fn from_score(score: f64) -> Self {
        DefaultConfidenceCalculator.from_score(score)
    }

    /// An explicit level/score pair. The score is clamped into `[0, 1]`.
    pub fn new(score: f64, level: ConfidenceLevel) -> Self {
        Self {
            score: clamp_score(score),
            level,
        }
    }

    /// Zero score, level `None`.
    pub fn none() -> Self {
        Self {
            score: 0.0,
            level: ConfidenceLevel::None,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn level(&self) -> ConfidenceLevel {
        self.level
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Strategy for turning a score into an [`IntentConfidence`].
pub trait ConfidenceCalculator: Send + Sync {
    fn from_score(&self, score: f64) -> IntentConfidence;
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

/// The fixed default thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfidenceCalculator;

impl ConfidenceCalculator for DefaultConfidenceCalculator {
    fn from_score(&self, score: f64) -> IntentConfidence {
        let score = clamp_score(score);
        let level = if score < 0.3 {
            ConfidenceLevel::Low
        } else if score < 0.6 {
            ConfidenceLevel::Medium
        } else if score < 0.85 {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Certain
        };
        IntentConfidence { score, level }
    }
}

/// Caller-supplied lower bounds for Medium, High, and Certain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfidenceCalculator {
    medium: f64,
    high: f64,
    certain: f64,
}

impl ThresholdConfidenceCalculator {
    /// # Errors
    ///
    /// Requires `0 < medium < high < certain <= 1`.
    pub fn new(medium: f64, high: f64, certain: f64) -> Result<Self, ConfigurationError> {
        let ordered = 0.0 < medium && medium < high && high < certain && certain <= 1.0;
        if !ordered {
            return Err(ConfigurationError::InvalidValue {
                field: "thresholds",
                reason: format!(
                    "expected 0 < medium < high < certain <= 1, got {medium}, {high}, {certain}"
                ),
            });
        }
        Ok(Self {
            medium,
            high,
            certain,
        })
    }
}

impl ConfidenceCalculator for ThresholdConfidenceCalculator {
    fn from_score(&self, score: f64) -> IntentConfidence {
        let score = clamp_score(score);
        let level = if score < self.medium {
            ConfidenceLevel::Low
        } else if score < self.high {
            ConfidenceLevel::Medium
        } else if score < self.certain {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Certain
        };
        IntentConfidence { score, level }
    }
}

/// Ignores the score and always returns the same confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedConfidenceCalculator {
    confidence: IntentConfidence,
}

impl FixedConfidenceCalculator {
    pub fn new(confidence: IntentConfidence) -> Self {
        Self { confidence }
    }
}

impl ConfidenceCalculator for FixedConfidenceCalculator {
    fn from_score(&self, _score: f64) -> IntentConfidence {
        self.confidence
    }
}
