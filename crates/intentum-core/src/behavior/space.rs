//! # Behavior Space
//!
//! An ordered, append-only sequence of [`BehaviorEvent`]s plus a space-level
//! metadata map (session or tenant tags).
//!
//! ## Vector Cache
//!
//! The space holds an explicit `cached_vector` slot. Only the no-options
//! [`BehaviorSpace::to_vector`] path reads or fills it; every call to
//! [`BehaviorSpace::to_vector_with`] or [`BehaviorSpace::to_vector_in_window`]
//! recomputes from the event list. [`BehaviorSpace::observe`] clears the slot.
//!
//! Windowed calls are never cached, even with identical bounds. Callers may
//! assume the plain path is the cheap one.
//!
//! ## Concurrency
//!
//! Single writer. `observe` takes `&mut self`, so concurrent ingestion into
//! one space is ruled out by the borrow checker. Shared `&BehaviorSpace`
//! readers may call `to_vector` concurrently; the slot is a `OnceLock`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::event::{BehaviorEvent, MetadataValue};
use super::vector::{BehaviorVector, ToVectorOptions};
use crate::error::IntentumResult;
use crate::temporal::TimeWindow;

/// Observed behavior: events in arrival order plus space-level metadata.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BehaviorSpace {
    events: Vec<BehaviorEvent>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, MetadataValue>,
    #[serde(skip)]
    cached_vector: OnceLock<BehaviorVector>,
}

impl std::fmt::Debug for BehaviorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorSpace")
            .field("events", &self.events.len())
            .field("metadata_keys", &self.metadata.len())
            .field("vector_cached", &self.is_vector_cached())
            .finish()
    }
}

impl BehaviorSpace {
    /// Create an empty space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and invalidate the cached vector.
    pub fn observe(&mut self, event: BehaviorEvent) {
        self.events.push(event);
        self.cached_vector = OnceLock::new();
    }

    /// All events in observation order.
    pub fn events(&self) -> &[BehaviorEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // -- Metadata ------------------------------------------------------------

    /// Set a space-level metadata entry. Does not touch the vector cache.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    pub fn metadata_map(&self) -> &BTreeMap<String, MetadataValue> {
        &self.metadata
    }

    // -- Vectorization -------------------------------------------------------

    /// Raw-count vector over all events. Cached until the next `observe`.
    pub fn to_vector(&self) -> &BehaviorVector {
        self.cached_vector.get_or_init(|| {
            BehaviorVector::from_keys(self.events.iter().map(|e| e.dimension_key()))
        })
    }

    /// Whether the no-options vector is currently cached.
    pub fn is_vector_cached(&self) -> bool {
        self.cached_vector.get().is_some()
    }

    /// Normalized vector over all events. Always recomputed.
    pub fn to_vector_with(&self, options: &ToVectorOptions) -> BehaviorVector {
        BehaviorVector::from_keys(self.events.iter().map(|e| e.dimension_key())).normalized(options)
    }

    /// Vector over events in `[start, end]`, optionally normalized. Always
    /// recomputed; never reads or fills the cache.
    pub fn to_vector_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        options: Option<&ToVectorOptions>,
    ) -> BehaviorVector {
        let raw = BehaviorVector::from_keys(
            self.events
                .iter()
                .filter(|e| e.occurred_at() >= start && e.occurred_at() <= end)
                .map(|e| e.dimension_key()),
        );
        match options {
            Some(opts) => raw.normalized(opts),
            None => raw,
        }
    }

    // -- Event queries -------------------------------------------------------

    /// Events with `start <= occurred_at <= end`, in observation order.
    pub fn events_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&BehaviorEvent> {
        self.events
            .iter()
            .filter(|e| e.occurred_at() >= start && e.occurred_at() <= end)
            .collect()
    }

    /// Events within `duration` before `now` (inclusive).
    pub fn events_in_last(&self, duration: Duration, now: DateTime<Utc>) -> Vec<&BehaviorEvent> {
        let window = TimeWindow::ending_at(now, duration);
        self.events_in_window(window.start(), window.end())
    }

    /// Time between the earliest and latest event. `None` when empty.
    pub fn time_span(&self) -> Option<Duration> {
        let first = self.events.iter().map(|e| e.occurred_at()).min()?;
        let last = self.events.iter().map(|e| e.occurred_at()).max()?;
        Some(last - first)
    }

    /// A new space holding only the events inside `window`, with this
    /// space's metadata carried over. The result may be empty.
    pub fn filtered(&self, window: &TimeWindow) -> BehaviorSpace {
        let mut out = BehaviorSpace {
            metadata: self.metadata.clone(),
            ..BehaviorSpace::default()
        };
        for event in self.events.iter().filter(|e| window.contains(e.occurred_at())) {
            out.observe(event.clone());
        }
        out
    }
}

// -- Snapshots ---------------------------------------------------------------

impl BehaviorSpace {
    /// Serialize events and metadata to JSON. The vector cache is not part
    /// of the snapshot.
    pub fn to_json(&self) -> IntentumResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a space from [`to_json`](Self::to_json) output. The restored
    /// space starts with an empty vector cache.
    pub fn from_json(json: &str) -> IntentumResult<Self> {
        let space: Self = serde_json::from_str(json)?;
        tracing::debug!(events = space.len(), "behavior space restored");
        Ok(space)
    }
}
