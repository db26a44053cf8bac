//! # Embedding Cache
//!
//! Caches provider answers per dimension key so repeated inferences over
//! similar spaces do not re-issue provider calls.
//!
//! Only successful embeddings are stored. A failed call is retried against
//! the provider on the next request for that key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use intentum_core::EmbeddingFailure;

use crate::embedding::{EmbeddingProvider, IntentEmbedding};

/// Storage for embeddings keyed by dimension key.
pub trait EmbeddingCache: Send + Sync {
    fn get(&self, key: &str) -> Option<IntentEmbedding>;
    fn set(&self, key: &str, embedding: IntentEmbedding);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// Default entry lifetime for [`MemoryEmbeddingCache`].
pub const DEFAULT_EMBEDDING_TTL: Duration = Duration::from_secs(3600);

/// Entry count past which [`MemoryEmbeddingCache`] sweeps expired entries
/// on insert.
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone)]
struct Entry {
    embedding: IntentEmbedding,
    /// `None` never expires, including TTLs too large for the clock.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process cache behind a `parking_lot::RwLock`.
#[derive(Debug)]
pub struct MemoryEmbeddingCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Option<Duration>,
}

impl Default for MemoryEmbeddingCache {
    fn default() -> Self {
        Self::with_ttl(Some(DEFAULT_EMBEDDING_TTL))
    }
}

impl MemoryEmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` keeps entries until removed.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl EmbeddingCache for MemoryEmbeddingCache {
    fn get(&self, key: &str) -> Option<IntentEmbedding> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.embedding.clone());
            }
        }
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    fn set(&self, key: &str, embedding: IntentEmbedding) {
        let now = Instant::now();
        let expires_at = self.ttl.and_then(|ttl| now.checked_add(ttl));
        let mut entries = self.entries.write();
        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, e| !e.is_expired(now));
        }
        entries.insert(
            key.to_string(),
            Entry {
                embedding,
                expires_at,
            },
        );
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Consults `cache` before calling `inner`.
#[derive(Debug)]
pub struct CachedEmbeddingProvider<P, C> {
    inner: P,
    cache: C,
}

impl<P: EmbeddingProvider, C: EmbeddingCache> CachedEmbeddingProvider<P, C> {
    pub fn new(inner: P, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: EmbeddingProvider, C: EmbeddingCache> EmbeddingProvider for CachedEmbeddingProvider<P, C> {
    fn embed(&self, key: &str) -> Result<IntentEmbedding, EmbeddingFailure> {
        if let Some(hit) = self.cache.get(key) {
            metrics::counter!("intentum_embedding_cache_total", "result" => "hit").increment(1);
            return Ok(hit);
        }
        metrics::counter!("intentum_embedding_cache_total", "result" => "miss").increment(1);
        let embedding = self.inner.embed(key)?;
        self.cache.set(key, embedding.clone());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEmbeddingProvider;
    use intentum_core::ProviderFailureKind;

    #[test]
    fn second_call_is_served_from_cache() {
        let provider =
            CachedEmbeddingProvider::new(MockEmbeddingProvider::new(), MemoryEmbeddingCache::new());
        let a = provider.embed("user:login").unwrap();
        let b = provider.embed("user:login").unwrap();
        assert_eq!(a, b);
        assert_eq!(provider.inner().calls(), 1);
        assert_eq!(provider.cache().len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mock = MockEmbeddingProvider::new().failing_on("bad:key", ProviderFailureKind::Timeout);
        let provider = CachedEmbeddingProvider::new(mock, MemoryEmbeddingCache::new());
        assert!(provider.embed("bad:key").is_err());
        assert!(provider.embed("bad:key").is_err());
        assert_eq!(provider.inner().calls(), 2);
        assert!(provider.cache().is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let cache = MemoryEmbeddingCache::new();
        cache.set("a", IntentEmbedding::new("a", 0.1));
        cache.set("b", IntentEmbedding::new("b", 0.2));
        cache.remove("a");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = MemoryEmbeddingCache::with_ttl(Some(Duration::ZERO));
        cache.set("a", IntentEmbedding::new("a", 0.1));
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn expired_entry_is_removed_on_get() {
        let cache = MemoryEmbeddingCache::with_ttl(Some(Duration::ZERO));
        cache.set("a", IntentEmbedding::new("a", 0.1));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn max_ttl_does_not_overflow() {
        let cache = MemoryEmbeddingCache::with_ttl(Some(Duration::MAX));
        cache.set("a", IntentEmbedding::new("a", 0.1));
        assert_eq!(cache.get("a").map(|e| e.score), Some(0.1));
    }

    #[test]
    fn no_ttl_keeps_entries() {
        let cache = MemoryEmbeddingCache::with_ttl(None);
        cache.set("a", IntentEmbedding::new("a", 0.1));
        assert_eq!(cache.get("a").map(|e| e.score), Some(0.1));
    }
}
