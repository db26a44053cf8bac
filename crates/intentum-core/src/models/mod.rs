//! # Inference Strategies
//!
//! All strategies implement [`IntentModel`](crate::model::IntentModel).
//!
//! | Model | Role |
//! |-------|------|
//! | [`RuleBasedIntentModel`] | ordered first-match rules over a space |
//! | [`ChainedIntentModel`] | primary, then fallback below a threshold |
//! | [`MultiStageIntentModel`] | ordered stages with per-stage thresholds |
//! | [`SlidingWindowIntentModel`] | filter to a recent window, then delegate |
//! | [`StrictIntentModel`] | downgrade confidence by one level |
//! | [`ObservableIntentModel`] | tracing span plus metrics, pass-through |
//! | [`BatchIntentModel`] | many spaces, sequential or async |
//! | [`CachedIntentModel`] | memoize by vector content |
//!
//! The embedding-similarity model lives in `intentum-ai`.

pub mod batch;
pub mod cached;
pub mod chained;
pub mod multi_stage;
pub mod observable;
pub mod rule_based;
pub mod sliding_window;
pub mod strict;

pub use batch::BatchIntentModel;
pub use cached::CachedIntentModel;
pub use chained::{ChainedIntentModel, DEFAULT_CHAIN_THRESHOLD};
pub use multi_stage::{MultiStageIntentModel, Stage};
pub use observable::ObservableIntentModel;
pub use rule_based::{IntentRule, RuleBasedIntentModel, RuleMatch};
pub use sliding_window::{ReferenceTime, SlidingWindowIntentModel};
pub use strict::StrictIntentModel;
