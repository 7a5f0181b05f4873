//! Request rate limiting
//!
//! Callers hold a [`RateLimiter`] and consult it before evaluating a request.
//! The engine modules never touch it, so they stay free of shared state.

use dashmap::DashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window resets
    pub reset_after: Duration,
}

/// Counts requests per key and decides whether another is allowed
pub trait RateLimiter: Send + Sync {
    /// Record a request for `key` and report whether it may proceed
    fn check_and_increment(&self, key: &str) -> RateDecision;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter per key
///
/// The first request for a key, or the first after its window expired, opens
/// a new window. A key that reached the limit is denied until the window ends.
/// Expired windows are swept at most once per window length, so keys that stop
/// sending requests do not stay tracked.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<String, Window>,
    last_sweep: Mutex<Instant>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            windows: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of keys with a tracked window
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drop windows that have already expired
    pub fn purge_expired(&self, now: Instant) {
        self.windows.retain(|_, w| w.reset_at > now);
    }

    /// Same as [`RateLimiter::check_and_increment`] at an explicit instant
    pub fn check_and_increment_at(&self, key: &str, now: Instant) -> RateDecision {
        self.maybe_sweep(now);

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now,
        });
        let window = entry.value_mut();

        if window.count == 0 || window.reset_at <= now {
            window.count = 1;
            window.reset_at = now + self.window;
            return RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - 1,
                reset_after: self.window,
            };
        }

        let reset_after = window.reset_at.saturating_duration_since(now);
        if window.count >= self.limit {
            return RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset_after,
            };
        }

        window.count += 1;
        RateDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit.saturating_sub(window.count),
            reset_after,
        }
    }
}

impl FixedWindowLimiter {
    /// Must run before an entry guard is taken; retain locks every shard
    fn maybe_sweep(&self, now: Instant) {
        // Another caller already sweeping is as good as sweeping here
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last) < self.window {
            return;
        }
        *last = now;
        drop(last);
        self.purge_expired(now);
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check_and_increment(&self, key: &str) -> RateDecision {
        self.check_and_increment_at(key, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit_then_denies() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();

        let remaining: Vec<_> = (0..3)
            .map(|_| limiter.check_and_increment_at("ip", now))
            .map(|d| {
                assert!(d.allowed);
                d.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = limiter.check_and_increment_at("ip", now + Duration::from_secs(10));
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_after, Duration::from_secs(50));
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_and_increment_at("ip", now).allowed);
        assert!(!limiter.check_and_increment_at("ip", now).allowed);

        let later = now + Duration::from_secs(61);
        let decision = limiter.check_and_increment_at("ip", later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_and_increment_at("a", now).allowed);
        assert!(limiter.check_and_increment_at("b", now).allowed);
        assert!(!limiter.check_and_increment_at("a", now).allowed);
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_purge_expired() {
        let limiter = FixedWindowLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();
        limiter.check_and_increment_at("a", now);

        limiter.purge_expired(now + Duration::from_secs(2));
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_expired_keys_are_swept_on_later_requests() {
        let limiter = FixedWindowLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();

        for i in 0..500 {
            limiter.check_and_increment_at(&format!("client-{i}"), now);
        }
        assert_eq!(limiter.tracked_keys(), 500);

        let later = now + Duration::from_secs(2);
        assert!(limiter.check_and_increment_at("fresh", later).allowed);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_live_windows_survive_a_sweep() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(10));
        let now = Instant::now();
        limiter.check_and_increment_at("old", now);
        limiter.check_and_increment_at("busy", now + Duration::from_secs(9));

        limiter.check_and_increment_at("new", now + Duration::from_secs(11));

        assert_eq!(limiter.tracked_keys(), 2);
        assert!(!limiter.check_and_increment_at("busy", now + Duration::from_secs(12)).allowed);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let limiter: Box<dyn RateLimiter> =
            Box::new(FixedWindowLimiter::new(2, Duration::from_secs(60)));
        assert!(limiter.check_and_increment("k").allowed);
        assert!(limiter.check_and_increment("k").allowed);
        assert!(!limiter.check_and_increment("k").allowed);
    }
}
