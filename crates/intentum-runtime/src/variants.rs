//! A/B policy variants.
//!
//! A selector maps each intent to a variant name; the named policy then
//! evaluates normally. An empty or unregistered name decides
//! [`PolicyDecision::Observe`].

use std::collections::BTreeMap;
use std::sync::Arc;

use intentum_core::Intent;

use crate::decision::PolicyDecision;
use crate::policy::IntentPolicy;

type Selector = Arc<dyn Fn(&Intent) -> String + Send + Sync>;

#[derive(Clone)]
pub struct PolicyVariantSet {
    variants: BTreeMap<String, IntentPolicy>,
    selector: Selector,
}

impl std::fmt::Debug for PolicyVariantSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyVariantSet")
            .field("variants", &self.variants.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl PolicyVariantSet {
    pub fn new<F>(variants: BTreeMap<String, IntentPolicy>, selector: F) -> Self
    where
        F: Fn(&Intent) -> String + Send + Sync + 'static,
    {
        Self {
            variants,
            selector: Arc::new(selector),
        }
    }

    /// The variant name chosen for `intent`, whether registered or not.
    pub fn select(&self, intent: &Intent) -> String {
        (self.selector)(intent)
    }

    /// The policy for `intent`'s variant, if one is registered.
    pub fn policy_for(&self, intent: &Intent) -> Option<(String, &IntentPolicy)> {
        let name = self.select(intent);
        if name.is_empty() {
            return None;
        }
        let policy = self.variants.get(&name)?;
        Some((name, policy))
    }

    pub fn decide(&self, intent: &Intent) -> PolicyDecision {
        match self.policy_for(intent) {
            Some((_, policy)) => policy.evaluate(intent).decision,
            None => PolicyDecision::Observe,
        }
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}
