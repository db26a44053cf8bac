//! # Temporal Windows
//!
//! Defines `TimeWindow`, an inclusive `[start, end]` interval over UTC
//! timestamps. Used by windowed vectorization, event queries, and the
//! sliding-window model.
//!
//! Both bounds are inclusive: an event that occurred exactly at `start` or
//! exactly at `end` is inside the window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// An inclusive UTC time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidValue`] if `end` precedes `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigurationError> {
        if end < start {
            return Err(ConfigurationError::InvalidValue {
                field: "window",
                reason: format!("end {end} precedes start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// The window of length `length` that ends at `reference`.
    ///
    /// A negative length is treated as zero. A length reaching past the
    /// earliest representable instant clamps `start` to
    /// [`DateTime::<Utc>::MIN_UTC`].
    pub fn ending_at(reference: DateTime<Utc>, length: Duration) -> Self {
        let length = length.max(Duration::zero());
        Self {
            start: reference
                .checked_sub_signed(length)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: reference,
        }
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive upper bound.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the window.
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `at` lies within `[start, end]`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
