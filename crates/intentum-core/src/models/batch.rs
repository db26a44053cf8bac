//! # Batch Inference
//!
//! Runs one model over many spaces, one result per input, in input order.
//!
//! - [`BatchIntentModel::infer_batch`]: sequential.
//! - [`BatchIntentModel::infer_batch_cancellable`]: sequential, checks the
//!   token before each space.
//! - [`BatchIntentModel::infer_batch_async`]: one `spawn_blocking` task per
//!   space on the tokio runtime, results joined in input order.
//!
//! A cancelled batch returns [`InferenceError::Cancelled`]. It never returns
//! a truncated result list.

use std::sync::Arc;

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::cancellation::CancellationToken;
use crate::error::InferenceError;
use crate::intent::Intent;
use crate::model::IntentModel;

/// Applies a shared model to collections of spaces.
#[derive(Clone)]
pub struct BatchIntentModel {
    inner: Arc<dyn IntentModel>,
}

impl std::fmt::Debug for BatchIntentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchIntentModel").finish_non_exhaustive()
    }
}

impl BatchIntentModel {
    pub fn new(inner: Arc<dyn IntentModel>) -> Self {
        Self { inner }
    }

    /// Infer every space in order. Empty input gives empty output.
    pub fn infer_batch(&self, spaces: &[BehaviorSpace]) -> Result<Vec<Intent>, InferenceError> {
        spaces.iter().map(|s| self.inner.infer(s, None)).collect()
    }

    /// Like [`infer_batch`](Self::infer_batch), stopping with
    /// `Err(Cancelled)` as soon as the token is observed.
    pub fn infer_batch_cancellable(
        &self,
        spaces: &[BehaviorSpace],
        cancel: &CancellationToken,
    ) -> Result<Vec<Intent>, InferenceError> {
        let mut intents = Vec::with_capacity(spaces.len());
        for (index, space) in spaces.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(
                    completed = index,
                    total = spaces.len(),
                    "batch inference cancelled"
                );
                return Err(InferenceError::Cancelled);
            }
            intents.push(self.inner.infer(space, None)?);
        }
        Ok(intents)
    }

    /// Infer concurrently on tokio's blocking pool.
    ///
    /// No new work is spawned after cancellation is observed, and tasks
    /// that have not started yet check the token before running.
    pub async fn infer_batch_async(
        &self,
        spaces: Vec<BehaviorSpace>,
        cancel: CancellationToken,
    ) -> Result<Vec<Intent>, InferenceError> {
        if spaces.is_empty() {
            return Ok(Vec::new());
        }

        let total = spaces.len();
        let mut handles = Vec::with_capacity(total);
        for space in spaces {
            if cancel.is_cancelled() {
                tracing::info!(spawned = handles.len(), total, "batch inference cancelled");
                return Err(InferenceError::Cancelled);
            }
            let model = Arc::clone(&self.inner);
            let token = cancel.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                token.check()?;
                model.infer(&space, None)
            }));
        }

        let mut intents = Vec::with_capacity(total);
        for handle in handles {
            let intent = handle
                .await
                .map_err(|e| InferenceError::Task(e.to_string()))??;
            intents.push(intent);
        }
        cancel.check()?;
        Ok(intents)
    }
}

impl IntentModel for BatchIntentModel {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        self.inner.infer(space, precomputed)
    }
}
