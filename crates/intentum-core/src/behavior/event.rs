//! Behavior events and their typed metadata values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scalar metadata value attached to an event or a space.
///
/// Serialized untagged, so JSON `"eu"`, `3.5`, and `true` map directly to
/// `Text`, `Number`, and `Bool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A string value.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
}

impl MetadataValue {
    /// The string payload, if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric payload, if this is `Number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One observed `(actor, action, time)` fact.
///
/// Fields are private; an event is immutable once it has been observed by a
/// [`BehaviorSpace`](super::BehaviorSpace). Metadata can only be attached
/// while constructing the event, via [`BehaviorEvent::with_metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    actor: String,
    action: String,
    occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, MetadataValue>,
}

impl BehaviorEvent {
    /// Create an event with no metadata.
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            occurred_at,
            metadata: BTreeMap::new(),
        }
    }

    /// Create an event stamped with the current time.
    pub fn now(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(actor, action, Utc::now())
    }

    /// Attach a metadata entry, replacing any existing value for `key`.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace the whole metadata map.
    pub fn with_metadata_map(mut self, metadata: BTreeMap<String, MetadataValue>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn metadata(&self) -> &BTreeMap<String, MetadataValue> {
        &self.metadata
    }

    /// The vector dimension this event contributes to: `actor:action`.
    pub fn dimension_key(&self) -> String {
        format!("{}:{}", self.actor, self.action)
    }
}
