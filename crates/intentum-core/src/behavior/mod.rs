//! # Behavior Model
//!
//! Events, spaces, and the vectors derived from them.
//!
//! - [`BehaviorEvent`]: one immutable `(actor, action, time, metadata)` fact.
//! - [`BehaviorSpace`]: append-only event log plus space metadata, with an
//!   explicit cache for the raw-count vector.
//! - [`BehaviorVector`]: `actor:action` → weight, optionally normalized.
//! - [`BehaviorSpaceBuilder`]: fluent construction.
//! - [`SanitizationOptions`]: masking and redaction for export.

mod builder;
mod event;
mod sanitize;
mod space;
mod vector;

pub use builder::BehaviorSpaceBuilder;
pub use event::{BehaviorEvent, MetadataValue};
pub use sanitize::{SanitizationOptions, REDACTED};
pub use space::BehaviorSpace;
pub use vector::{BehaviorVector, ToVectorOptions, VectorNormalization};
