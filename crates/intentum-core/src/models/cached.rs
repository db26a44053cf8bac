//! Result caching keyed by behavior vector content.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::behavior::{BehaviorSpace, BehaviorVector};
use crate::digest::sha256_hex;
use crate::error::InferenceError;
use crate::intent::Intent;
use crate::model::{resolve_vector, IntentModel};

/// Entry count past which an insert first sweeps expired entries.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct CacheEntry {
    intent: Intent,
    /// `None` never expires, including TTLs too large for the clock.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Caches the inner model's successful results.
///
/// Two spaces with equal vectors share a cache entry. Errors are never
/// cached. An optional TTL bounds entry lifetime.
pub struct CachedIntentModel<M> {
    inner: M,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl<M: IntentModel> CachedIntentModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        before - entries.len()
    }

    fn lookup(&self, key: &str) -> Option<Intent> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.intent.clone());
            }
        }
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    fn store(&self, key: String, intent: Intent) {
        let now = Instant::now();
        let expires_at = self.ttl.and_then(|ttl| now.checked_add(ttl));
        let mut entries = self.entries.write();
        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, e| !e.is_expired(now));
        }
        entries.insert(key, CacheEntry { intent, expires_at });
    }
}

/// SHA-256 over the vector's dimensions in key order.
pub fn vector_cache_key(vector: &BehaviorVector) -> String {
    let mut canonical = String::new();
    for (key, value) in vector.iter() {
        canonical.push_str(&format!("{}:{}={}\n", key.len(), key, value));
    }
    sha256_hex(canonical.as_bytes())
}

impl<M: IntentModel> IntentModel for CachedIntentModel<M> {
    fn infer(
        &self,
        space: &BehaviorSpace,
        precomputed: Option<&BehaviorVector>,
    ) -> Result<Intent, InferenceError> {
        let vector = resolve_vector(space, precomputed);
        let key = vector_cache_key(vector);

        if let Some(intent) = self.lookup(&key) {
            tracing::trace!(key = %key, "intent cache hit");
            return Ok(intent);
        }

        let intent = self.inner.infer(space, Some(vector))?;
        self.store(key, intent.clone());
        Ok(intent)
    }
}
