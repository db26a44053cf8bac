//! # Rate Limiting
//!
//! Keyed fixed-window counters. Over-limit is a result value, never an
//! error: [`RateLimitResult::allowed`] is `false` and
//! [`RateLimitResult::retry_after`] says how long until the window rolls.
//!
//! ## Windows
//!
//! A bucket is identified by `(key, window)`, so the same key throttled with
//! two different window lengths keeps two independent counters.
//! [`RateLimiter::reset`] clears every window for a key.
//!
//! Rollover and increment happen under one lock acquisition: a request that
//! lands after the window end starts a new window with count 1. A window too
//! long for the monotonic clock never rolls over.
//!
//! ## Cleanup
//!
//! Every [`CLEANUP_INTERVAL`]th acquire drops buckets whose window has
//! already ended, so keys that stop arriving do not pin memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

/// Outcome of one acquire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests counted in the current window, this one included.
    pub current_count: u32,
    pub limit: u32,
    /// Time until the current window ends. Set only when not allowed.
    pub retry_after: Option<Duration>,
}

/// Keyed request throttling.
pub trait RateLimiter: Send + Sync {
    fn try_acquire(&self, key: &str, limit: u32, window: Duration) -> RateLimitResult;

    /// Forget all state for `key`.
    fn reset(&self, key: &str);
}

impl<L: RateLimiter + ?Sized> RateLimiter for std::sync::Arc<L> {
    fn try_acquire(&self, key: &str, limit: u32, window: Duration) -> RateLimitResult {
        (**self).try_acquire(key, limit, window)
    }

    fn reset(&self, key: &str) {
        (**self).reset(key)
    }
}

// ---------------------------------------------------------------------------
// MemoryRateLimiter
// ---------------------------------------------------------------------------

/// Acquires between sweeps of ended windows.
pub const CLEANUP_INTERVAL: u64 = 100;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

impl Bucket {
    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.window_start)
    }
}

/// In-process fixed-window limiter.
#[derive(Default)]
pub struct MemoryRateLimiter {
    buckets: Mutex<HashMap<(String, Duration), Bucket>>,
    acquires: AtomicU64,
}

impl std::fmt::Debug for MemoryRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRateLimiter")
            .field("buckets", &self.buckets.lock().len())
            .finish()
    }
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// [`RateLimiter::try_acquire`] against an explicit clock reading.
    pub fn try_acquire_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitResult {
        let seen = self.acquires.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % CLEANUP_INTERVAL == 0 {
            let removed = self.cleanup_at(now);
            tracing::debug!(removed, "rate limiter cleanup");
        }

        let (count, remaining) = {
            let mut buckets = self.buckets.lock();
            let bucket = buckets
                .entry((key.to_string(), window))
                .or_insert(Bucket {
                    count: 0,
                    window_start: now,
                });
            if bucket.elapsed(now) >= window {
                bucket.window_start = now;
                bucket.count = 0;
            }
            bucket.count = bucket.count.saturating_add(1);
            (bucket.count, window.saturating_sub(bucket.elapsed(now)))
        };

        let allowed = count <= limit;
        let retry_after = if allowed {
            None
        } else {
            tracing::warn!(
                key,
                count,
                limit,
                retry_after_ms = remaining.as_millis() as u64,
                "rate limit exceeded"
            );
            Some(remaining)
        };

        RateLimitResult {
            allowed,
            current_count: count,
            limit,
            retry_after,
        }
    }

    /// Number of live `(key, window)` buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().len()
    }

    /// Drop buckets whose window has ended. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    fn cleanup_at(&self, now: Instant) -> usize {
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|(_, window), bucket| bucket.elapsed(now) < *window);
        before - buckets.len()
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn try_acquire(&self, key: &str, limit: u32, window: Duration) -> RateLimitResult {
        self.try_acquire_at(key, limit, window, Instant::now())
    }

    fn reset(&self, key: &str) {
        self.buckets.lock().retain(|(k, _), _| k != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn first_request_is_allowed_with_count_one() {
        let limiter = MemoryRateLimiter::new();
        let r = limiter.try_acquire("k", 5, MINUTE);
        assert!(r.allowed);
        assert_eq!(r.current_count, 1);
        assert_eq!(r.limit, 5);
        assert_eq!(r.retry_after, None);
    }

    #[test]
    fn over_limit_has_retry_hint() {
        let limiter = MemoryRateLimiter::new();
        let t0 = Instant::now();
        limiter.try_acquire_at("k", 1, MINUTE, t0);
        let r = limiter.try_acquire_at("k", 1, MINUTE, t0 + Duration::from_secs(10));
        assert!(!r.allowed);
        assert_eq!(r.current_count, 2);
        assert_eq!(r.retry_after, Some(Duration::from_secs(50)));
    }

    #[test]
    fn window_rolls_over() {
        let limiter = MemoryRateLimiter::new();
        let t0 = Instant::now();
        limiter.try_acquire_at("k", 1, MINUTE, t0);
        assert!(!limiter.try_acquire_at("k", 1, MINUTE, t0 + Duration::from_secs(59)).allowed);
        let r = limiter.try_acquire_at("k", 1, MINUTE, t0 + MINUTE);
        assert!(r.allowed);
        assert_eq!(r.current_count, 1);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = MemoryRateLimiter::new();
        limiter.try_acquire("a", 1, MINUTE);
        assert!(!limiter.try_acquire("a", 1, MINUTE).allowed);
        assert!(limiter.try_acquire("b", 1, MINUTE).allowed);
    }

    #[test]
    fn windows_are_independent_per_key() {
        let limiter = MemoryRateLimiter::new();
        limiter.try_acquire("a", 1, MINUTE);
        assert!(limiter.try_acquire("a", 1, Duration::from_secs(1)).allowed);
        assert_eq!(limiter.bucket_count(), 2);
    }

    #[test]
    fn reset_clears_every_window_for_the_key() {
        let limiter = MemoryRateLimiter::new();
        limiter.try_acquire("a", 1, MINUTE);
        limiter.try_acquire("a", 1, Duration::from_secs(1));
        limiter.try_acquire("ab", 1, MINUTE);
        limiter.reset("a");
        assert_eq!(limiter.bucket_count(), 1);
        assert_eq!(limiter.try_acquire("a", 1, MINUTE).current_count, 1);
    }

    #[test]
    fn unbounded_window_never_rolls_over() {
        let limiter = MemoryRateLimiter::new();
        let t0 = Instant::now();
        assert!(limiter.try_acquire("k", 1, Duration::MAX).allowed);
        let r = limiter.try_acquire_at("k", 1, Duration::MAX, t0 + Duration::from_secs(86_400));
        assert!(!r.allowed);
        assert_eq!(r.current_count, 2);
        assert!(r.retry_after.is_some());
    }

    #[test]
    fn cleanup_drops_ended_windows_only() {
        let limiter = MemoryRateLimiter::new();
        let t0 = Instant::now();
        limiter.try_acquire_at("short", 5, Duration::from_secs(1), t0);
        limiter.try_acquire_at("long", 5, MINUTE, t0);
        assert_eq!(limiter.cleanup_at(t0 + Duration::from_secs(2)), 1);
        assert_eq!(limiter.bucket_count(), 1);
    }

    #[test]
    fn periodic_cleanup_bounds_idle_keys() {
        let limiter = MemoryRateLimiter::new();
        let t0 = Instant::now();
        for n in 0..CLEANUP_INTERVAL - 1 {
            limiter.try_acquire_at(&format!("idle-{n}"), 5, Duration::from_secs(1), t0);
        }
        assert_eq!(limiter.bucket_count(), (CLEANUP_INTERVAL - 1) as usize);
        limiter.try_acquire_at("fresh", 5, Duration::from_secs(1), t0 + Duration::from_secs(5));
        assert_eq!(limiter.bucket_count(), 1);
    }

    #[test]
    fn zero_limit_never_allows() {
        let limiter = MemoryRateLimiter::new();
        assert!(!limiter.try_acquire("k", 0, MINUTE).allowed);
    }

    #[test]
    fn concurrent_acquires_lose_no_updates() {
        let limiter = Arc::new(MemoryRateLimiter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        limiter.try_acquire("shared", 10_000, MINUTE);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(limiter.try_acquire("shared", 10_000, MINUTE).current_count, 2001);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ordinals_up_to_limit_then_denied(limit in 1u32..50) {
                let limiter = MemoryRateLimiter::new();
                let t0 = Instant::now();
                for n in 1..=limit {
                    let r = limiter.try_acquire_at("key", limit, MINUTE, t0);
                    prop_assert!(r.allowed);
                    prop_assert_eq!(r.current_count, n);
                }
                let over = limiter.try_acquire_at("key", limit, MINUTE, t0);
                prop_assert!(!over.allowed);
                prop_assert!(over.retry_after.is_some());

                limiter.reset("key");
                let after = limiter.try_acquire_at("key", limit, MINUTE, t0);
                prop_assert!(after.allowed);
                prop_assert_eq!(after.current_count, 1);
            }
        }
    }
}
