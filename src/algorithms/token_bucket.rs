//! Token bucket: starts full, spends one token per admission and earns one
//! token back per elapsed `interval`.

use super::whole_periods;
use crate::clock::{Clock, SystemClock};
use crate::rate_limiter::RateLimiter;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct TokenState {
    remaining: u64,
    last_check: Instant,
}

/// Thread-safe token bucket limiter.
///
/// Refill is computed lazily inside [`RateLimiter::allow`]; an idle bucket
/// costs nothing and catches up (clamped to `limit`) on its next check.
#[derive(Debug)]
pub struct TokenBucket<C: Clock = SystemClock> {
    limit: u64,
    interval: Duration,
    state: Mutex<TokenState>,
    clock: C,
}

impl TokenBucket<SystemClock> {
    pub fn new(limit: u64, interval: Duration) -> Self {
        Self::with_clock(limit, interval, SystemClock)
    }
}

impl<C: Clock> TokenBucket<C> {
    pub fn with_clock(limit: u64, interval: Duration, clock: C) -> Self {
        let state = TokenState {
            remaining: limit,
            last_check: clock.now(),
        };

        Self {
            limit,
            interval,
            state: Mutex::new(state),
            clock,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tokens left as of the last check. Does not refill.
    pub fn remaining(&self) -> u64 {
        self.state.lock().remaining
    }
}

impl<C: Clock> RateLimiter for TokenBucket<C> {
    fn allow(&self) -> bool {
        let mut state = self.state.lock();

        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(state.last_check);
        let tokens_to_add = whole_periods(elapsed, self.interval);

        // Partial intervals keep accumulating: last_check only moves on refill.
        if tokens_to_add > 0 {
            let refilled = u128::from(state.remaining)
                .saturating_add(tokens_to_add)
                .min(u128::from(self.limit));
            state.remaining = refilled as u64;
            state.last_check = now;

            tracing::trace!(
                remaining = state.remaining,
                limit = self.limit,
                "token bucket refilled"
            );
        }

        if state.remaining > 0 {
            state.remaining -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn bucket(limit: u64, interval: Duration) -> (TokenBucket<MockClock>, MockClock) {
        let clock = MockClock::default();
        (TokenBucket::with_clock(limit, interval, clock.clone()), clock)
    }

    #[test]
    fn test_starts_full() {
        let (bucket, _) = bucket(5, Duration::from_secs(1));
        assert_eq!(bucket.remaining(), 5);
        assert_eq!(bucket.limit(), 5);
        assert_eq!(bucket.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_burst_then_block() {
        let (bucket, _) = bucket(5, Duration::from_secs(1));
        for i in 0..5 {
            assert!(bucket.allow(), "request {} should be admitted", i + 1);
        }
        assert!(!bucket.allow());
        assert_eq!(bucket.remaining(), 0);
    }

    #[test]
    fn test_recovery_after_wait() {
        let (bucket, clock) = bucket(3, Duration::from_millis(500));
        for _ in 0..3 {
            assert!(bucket.allow());
        }
        assert!(!bucket.allow());

        clock.advance(Duration::from_millis(1000));

        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn test_partial_interval_accumulates() {
        let (bucket, clock) = bucket(1, Duration::from_millis(500));
        assert!(bucket.allow());

        clock.advance(Duration::from_millis(300));
        assert!(!bucket.allow());

        // 300ms + 300ms crosses one full interval since the last refill.
        clock.advance(Duration::from_millis(300));
        assert!(bucket.allow());
    }

    #[test]
    fn test_idle_catch_up_is_clamped() {
        let (bucket, clock) = bucket(4, Duration::from_nanos(1));
        for _ in 0..4 {
            assert!(bucket.allow());
        }

        clock.advance(Duration::from_secs(100 * 365 * 24 * 60 * 60));

        for _ in 0..4 {
            assert!(bucket.allow());
        }
        assert!(!bucket.allow());
    }

    #[test]
    fn test_zero_limit_always_denies() {
        let (bucket, clock) = bucket(0, Duration::from_millis(10));
        assert!(!bucket.allow());
        clock.advance(Duration::from_secs(60));
        assert!(!bucket.allow());
        assert_eq!(bucket.remaining(), 0);
    }

    #[test]
    fn test_zero_interval_refills_every_call() {
        let (bucket, _) = bucket(2, Duration::ZERO);
        for _ in 0..10 {
            assert!(bucket.allow());
        }
        assert!(bucket.remaining() <= 2);
    }

    #[test]
    fn test_clock_going_backwards_does_not_refill() {
        let clock = MockClock::default();
        let start = clock.now();
        clock.advance(Duration::from_secs(10));
        let bucket = TokenBucket::with_clock(1, Duration::from_secs(1), clock.clone());

        assert!(bucket.allow());
        clock.set(start);
        assert!(!bucket.allow());
    }

    #[test]
    fn test_remaining_stays_within_limit() {
        let (bucket, clock) = bucket(3, Duration::from_millis(100));
        for step in 0..50u64 {
            bucket.allow();
            assert!(bucket.remaining() <= bucket.limit());
            clock.advance(Duration::from_millis(step * 37 % 450));
        }
    }

    #[test]
    fn test_concurrent_admissions_are_exact() {
        const CALLERS: usize = 64;
        const LIMIT: u64 = 10;

        let clock = MockClock::default();
        let bucket = Arc::new(TokenBucket::with_clock(LIMIT, Duration::from_secs(3600), clock));
        let barrier = Arc::new(Barrier::new(CALLERS));
        let admitted = Arc::new(AtomicUsize::new(0));
        let denied = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                let barrier = Arc::clone(&barrier);
                let admitted = Arc::clone(&admitted);
                let denied = Arc::clone(&denied);
                thread::spawn(move || {
                    barrier.wait();
                    if bucket.allow() {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    } else {
                        denied.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), LIMIT as usize);
        assert_eq!(denied.load(Ordering::SeqCst), CALLERS - LIMIT as usize);
        assert_eq!(bucket.remaining(), 0);
    }
}
