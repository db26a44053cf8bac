//! # Execution and Decision Records
//!
//! [`PolicyExecutionRecord`] describes one policy evaluation: what was
//! decided, by which rule, how long it took, and whether a predicate failed.
//! [`ExecutionLog`] keeps a bounded history of them.
//!
//! [`DecisionRecord`] is the persistence shape downstream analytics and
//! explainability consumers store. The runtime builds it; it never stores it.

use std::collections::BTreeMap;
use std::error::Error;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use intentum_core::{ConfidenceLevel, Intent, MetadataValue};

use crate::decision::PolicyDecision;

// ---------------------------------------------------------------------------
// PolicyExecutionRecord
// ---------------------------------------------------------------------------

/// One policy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyExecutionRecord {
    pub intent_name: String,
    pub matched_rule: Option<String>,
    pub decision: PolicyDecision,
    pub duration_ms: f64,
    /// `false` when a rule predicate failed.
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_trace: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl PolicyExecutionRecord {
    pub fn succeeded(
        intent_name: impl Into<String>,
        matched_rule: Option<String>,
        decision: PolicyDecision,
        duration_ms: f64,
    ) -> Self {
        Self {
            intent_name: intent_name.into(),
            matched_rule,
            decision,
            duration_ms,
            success: true,
            error_message: None,
            error_trace: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn failed(
        intent_name: impl Into<String>,
        decision: PolicyDecision,
        duration_ms: f64,
        error: &(dyn Error + 'static),
    ) -> Self {
        Self {
            intent_name: intent_name.into(),
            matched_rule: None,
            decision,
            duration_ms,
            success: false,
            error_message: Some(error.to_string()),
            error_trace: Some(error_trace(error)),
            recorded_at: Utc::now(),
        }
    }
}

/// Render an error and its `source()` chain, one cause per line.
pub fn error_trace(error: &(dyn Error + 'static)) -> String {
    let mut lines = vec![error.to_string()];
    let mut cause = error.source();
    while let Some(err) = cause {
        lines.push(format!("caused by: {err}"));
        cause = err.source();
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// ExecutionLog
// ---------------------------------------------------------------------------

/// Bounded, append-only history of execution records.
///
/// When full, the oldest 10% of entries are dropped before appending.
pub struct ExecutionLog {
    records: Mutex<Vec<PolicyExecutionRecord>>,
    max_records: usize,
}

impl std::fmt::Debug for ExecutionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionLog")
            .field("records", &self.len())
            .field("max_records", &self.max_records)
            .finish()
    }
}

impl ExecutionLog {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            max_records: max_records.max(1),
        }
    }

    pub fn append(&self, record: PolicyExecutionRecord) {
        let mut records = self.records.lock();
        if records.len() >= self.max_records {
            let trim = (self.max_records / 10).max(1);
            let n = trim.min(records.len());
            records.drain(..n);
        }
        records.push(record);
    }

    /// Snapshot of every retained record, oldest first.
    pub fn records(&self) -> Vec<PolicyExecutionRecord> {
        self.records.lock().clone()
    }

    pub fn failures(&self) -> Vec<PolicyExecutionRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| !r.success)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<PolicyExecutionRecord> {
        self.records.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// DecisionRecord
// ---------------------------------------------------------------------------

/// Persistable record of one intent decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub record_id: Uuid,
    pub behavior_space_id: String,
    pub intent_name: String,
    pub confidence_level: ConfidenceLevel,
    pub confidence_score: f64,
    pub decision: PolicyDecision,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl DecisionRecord {
    pub fn new(
        behavior_space_id: impl Into<String>,
        intent: &Intent,
        decision: PolicyDecision,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            behavior_space_id: behavior_space_id.into(),
            intent_name: intent.name.clone(),
            confidence_level: intent.level(),
            confidence_score: intent.score(),
            decision,
            recorded_at: Utc::now(),
            metadata: None,
            entity_id: None,
        }
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}
