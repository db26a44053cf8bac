//! # Declarative Policy Store
//!
//! Policies described as data, loaded from JSON or YAML and compiled into an
//! [`IntentPolicy`].
//!
//! ## Document Shape
//!
//! ```yaml
//! version: "1.0"
//! rules:
//!   - name: block-low-confidence
//!     decision: Block
//!     conditions:
//!       - { property: intent.confidence.level, operator: lte, value: Low }
//!   - name: allow-rest
//!     decision: Allow
//! ```
//!
//! ## Condition Semantics
//!
//! | Property | Operators | Value |
//! |---|---|---|
//! | `intent.name` | `eq` `ne` `contains` | text, compared ignoring case |
//! | `intent.confidence.level` | `eq` `ne` `contains` (text); `gte` `lte` `gt` `lt` (level order) | level name |
//! | `intent.confidence.score` | `eq` `ne` `gte` `lte` `gt` `lt` | number or numeric text |
//! | `intent.signals.count` | `eq` `ne` `gte` `lte` `gt` `lt` | number or numeric text |
//!
//! Conditions within a rule AND together; a rule without conditions always
//! matches. Property and operator names are trimmed and matched ignoring
//! case. Anything the store does not understand fails at load time, never
//! at evaluation time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use intentum_core::{ConfidenceLevel, Intent};

use crate::decision::PolicyDecision;
use crate::error::PolicyStoreError;
use crate::policy::IntentPolicy;
use crate::rule::PolicyRule;

const SCORE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub rules: Vec<PolicyRuleDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRuleDocument {
    pub name: String,
    #[serde(default = "default_decision")]
    pub decision: String,
    #[serde(default)]
    pub conditions: Vec<PolicyConditionDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConditionDocument {
    pub property: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    pub value: Value,
}

fn default_version() -> String {
    "1.0".into()
}

fn default_decision() -> String {
    PolicyDecision::Observe.as_str().into()
}

fn default_operator() -> String {
    "eq".into()
}

impl PolicyDocument {
    pub fn from_json_str(json: &str) -> Result<Self, PolicyStoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, PolicyStoreError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a document, choosing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyStoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        if is_yaml(path) {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    /// Validate every rule and build the policy, preserving rule order.
    pub fn compile(&self) -> Result<IntentPolicy, PolicyStoreError> {
        let rules = self
            .rules
            .iter()
            .map(PolicyRuleDocument::compile)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(version = %self.version, rules = rules.len(), "compiled policy document");
        Ok(IntentPolicy::new(rules))
    }
}

impl PolicyRuleDocument {
    fn compile(&self) -> Result<PolicyRule, PolicyStoreError> {
        let decision =
            PolicyDecision::parse(&self.decision).ok_or_else(|| PolicyStoreError::UnknownDecision {
                rule: self.name.clone(),
                decision: self.decision.clone(),
            })?;
        let conditions = self
            .conditions
            .iter()
            .map(|c| Condition::compile(&self.name, c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PolicyRule::new(self.name.clone(), decision, move |intent| {
            conditions.iter().all(|c| c.matches(intent))
        }))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

// ---------------------------------------------------------------------------
// FilePolicyStore
// ---------------------------------------------------------------------------

/// A policy document on disk.
#[derive(Debug, Clone)]
pub struct FilePolicyStore {
    path: PathBuf,
}

impl FilePolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read and compile the document. Each call sees the file's
    /// current contents.
    pub fn load(&self) -> Result<IntentPolicy, PolicyStoreError> {
        PolicyDocument::from_file(&self.path)?.compile().map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "policy document rejected");
            e
        })
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Property {
    Name,
    Level,
    Score,
    SignalCount,
}

impl Property {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "intent.name" => Some(Self::Name),
            "intent.confidence.level" => Some(Self::Level),
            "intent.confidence.score" => Some(Self::Score),
            "intent.signals.count" => Some(Self::SignalCount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Eq,
    Ne,
    Contains,
    Gte,
    Lte,
    Gt,
    Lt,
}

impl Operator {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "contains" => Some(Self::Contains),
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }

    fn is_ordering(self) -> bool {
        matches!(self, Self::Gte | Self::Lte | Self::Gt | Self::Lt)
    }

    fn compare<T: PartialOrd>(self, actual: T, expected: T) -> bool {
        match self {
            Self::Gte => actual >= expected,
            Self::Lte => actual <= expected,
            Self::Gt => actual > expected,
            Self::Lt => actual < expected,
            Self::Eq | Self::Ne | Self::Contains => false,
        }
    }
}

#[derive(Debug, Clone)]
enum Expected {
    /// Lowercased.
    Text(String),
    Number(f64),
    Level(ConfidenceLevel),
}

#[derive(Debug, Clone)]
struct Condition {
    property: Property,
    operator: Operator,
    expected: Expected,
}

impl Condition {
    fn compile(rule: &str, doc: &PolicyConditionDocument) -> Result<Self, PolicyStoreError> {
        let property =
            Property::parse(&doc.property).ok_or_else(|| PolicyStoreError::UnknownProperty {
                rule: rule.to_string(),
                property: doc.property.clone(),
            })?;
        let operator =
            Operator::parse(&doc.operator).ok_or_else(|| PolicyStoreError::UnknownOperator {
                rule: rule.to_string(),
                operator: doc.operator.clone(),
            })?;
        let invalid = |reason: String| PolicyStoreError::InvalidValue {
            rule: rule.to_string(),
            property: doc.property.clone(),
            reason,
        };

        let text = || value_text(&doc.value).ok_or_else(|| invalid("expected text".into()));
        let expected = match property {
            Property::Name => {
                if operator.is_ordering() {
                    return Err(invalid(format!(
                        "operator `{}` does not apply to text",
                        doc.operator.trim()
                    )));
                }
                Expected::Text(text()?)
            }
            Property::Level if operator.is_ordering() => {
                let name = value_text(&doc.value)
                    .ok_or_else(|| invalid("expected a level name".into()))?;
                let level = ConfidenceLevel::parse(&name)
                    .ok_or_else(|| invalid(format!("unknown confidence level `{name}`")))?;
                Expected::Level(level)
            }
            Property::Level => Expected::Text(text()?),
            Property::Score | Property::SignalCount => {
                if operator == Operator::Contains {
                    return Err(invalid("`contains` does not apply to numbers".into()));
                }
                let number = value_number(&doc.value)
                    .ok_or_else(|| invalid("expected a number".into()))?;
                Expected::Number(number)
            }
        };

        Ok(Self {
            property,
            operator,
            expected,
        })
    }

    fn matches(&self, intent: &Intent) -> bool {
        match (&self.expected, self.property) {
            (Expected::Text(expected), Property::Name) => self.text(&intent.name, expected),
            (Expected::Text(expected), Property::Level) => {
                self.text(intent.level().as_str(), expected)
            }
            (Expected::Level(expected), _) => self.operator.compare(intent.level(), *expected),
            (Expected::Number(expected), Property::Score) => self.number(intent.score(), *expected),
            (Expected::Number(expected), Property::SignalCount) => {
                self.number(intent.signals.len() as f64, *expected)
            }
            _ => false,
        }
    }

    fn text(&self, actual: &str, expected: &str) -> bool {
        let actual = actual.to_lowercase();
        match self.operator {
            Operator::Eq => actual == expected,
            Operator::Ne => actual != expected,
            Operator::Contains => actual.contains(expected),
            _ => false,
        }
    }

    fn number(&self, actual: f64, expected: f64) -> bool {
        match self.operator {
            Operator::Eq => (actual - expected).abs() < SCORE_EPSILON,
            Operator::Ne => (actual - expected).abs() >= SCORE_EPSILON,
            op => op.compare(actual, expected),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
