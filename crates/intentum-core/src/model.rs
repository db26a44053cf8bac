//! # The Intent Model Contract
//!
//! Every inference strategy and every wrapper implements [`IntentModel`].
//! Wrappers hold one or more inner models and are themselves models, so
//! strategies compose as a decorator chain:
//!
//! ```text
//! Observable(Chained(RuleBased, Strict(Llm)))
//! ```
//!
//! A caller that already derived the space's vector passes it as
//! `precomputed`; models must use it instead of re-deriving from the space.

use std::sync::Arc;

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::error::InferenceError;
use crate::intent::Intent;

/// Produces an [`Intent`] from a [`BehaviorSpace`].
///
/// Implementations must not mutate the space and must be safe to call
/// concurrently across independent spaces.
pub trait IntentModel: Send + Sync {
    /// Infer an intent.
    ///
    /// # Errors
    ///
    /// Only models backed by an external provider fail; the provider's
    /// error is returned unchanged.
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError>;
}

impl<M: IntentModel + ?Sized> IntentModel for Arc<M> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        (**self).infer(space, precomputed)
    }
}

impl<M: IntentModel + ?Sized> IntentModel for Box<M> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        (**self).infer(space, precomputed)
    }
}

/// The vector to use for inference: the caller's, or the space's cached one.
pub fn resolve_vector<'a>(
    space: &'a BehaviorSpace,
    precomputed: Option<&'a BehaviorVector>,
) -> &'a BehaviorVector {
    match precomputed {
        Some(vector) => vector,
        None => space.to_vector(),
    }
}
