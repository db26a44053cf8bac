//! Restrict inference to a recent time window.

use chrono::{DateTime, Duration, Utc};

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::error::InferenceError;
use crate::intent::Intent;
use crate::model::IntentModel;
use crate::temporal::TimeWindow;

/// Where the window ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTime {
    /// The wall clock at each call.
    Now,
    /// A fixed instant. Equal inputs give equal outputs.
    Fixed(DateTime<Utc>),
}

/// Filters the space to `[reference - window, reference]` before
/// delegating to the inner model.
///
/// The filtered space keeps the source space's metadata. It is passed to
/// the inner model even when it holds no events. Any precomputed vector is
/// discarded, since it describes the unfiltered space.
pub struct SlidingWindowIntentModel<M> {
    inner: M,
    window: Duration,
    reference: ReferenceTime,
}

impl<M: IntentModel> SlidingWindowIntentModel<M> {
    /// Window ending at the wall clock.
    pub fn new(inner: M, window: Duration) -> Self {
        Self {
            inner,
            window,
            reference: ReferenceTime::Now,
        }
    }

    /// Window ending at a fixed instant.
    pub fn at(inner: M, window: Duration, reference: DateTime<Utc>) -> Self {
        Self {
            inner,
            window,
            reference: ReferenceTime::Fixed(reference),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn current_window(&self) -> TimeWindow {
        let end = match self.reference {
            ReferenceTime::Now => Utc::now(),
            ReferenceTime::Fixed(at) => at,
        };
        TimeWindow::ending_at(end, self.window)
    }
}

impl<M: IntentModel> IntentModel for SlidingWindowIntentModel<M> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        _precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let window = self.current_window();
        let filtered = space.filtered(&window);
        tracing::trace!(
            window = %window,
            kept = filtered.len(),
            total = space.len(),
            "sliding window applied"
        );
        self.inner.infer(&filtered, None)
    }
}
