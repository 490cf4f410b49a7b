//! Leaky bucket: starts empty, adds one unit of water per admission and
//! drains one unit per elapsed `rate`.

use super::whole_periods;
use crate::clock::{Clock, SystemClock};
use crate::rate_limiter::RateLimiter;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WaterState {
    water: u64,
    last_leak: Instant,
}

/// Thread-safe leaky bucket limiter.
#[derive(Debug)]
pub struct LeakyBucket<C: Clock = SystemClock> {
    capacity: u64,
    rate: Duration,
    state: Mutex<WaterState>,
    clock: C,
}

impl LeakyBucket<SystemClock> {
    pub fn new(capacity: u64, rate: Duration) -> Self {
        Self::with_clock(capacity, rate, SystemClock)
    }
}

impl<C: Clock> LeakyBucket<C> {
    pub fn with_clock(capacity: u64, rate: Duration, clock: C) -> Self {
        let state = WaterState {
            water: 0,
            last_leak: clock.now(),
        };

        Self {
            capacity,
            rate,
            state: Mutex::new(state),
            clock,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn rate(&self) -> Duration {
        self.rate
    }

    /// Water level as of the last check. Does not leak.
    pub fn water(&self) -> u64 {
        self.state.lock().water
    }
}

impl<C: Clock> RateLimiter for LeakyBucket<C> {
    fn allow(&self) -> bool {
        let mut state = self.state.lock();

        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(state.last_leak);
        let leaked = whole_periods(elapsed, self.rate);

        if leaked > 0 {
            // Saturating at zero stands in for the "subtract then clamp" step.
            state.water = u128::from(state.water).saturating_sub(leaked) as u64;
            state.last_leak = now;

            tracing::trace!(
                water = state.water,
                capacity = self.capacity,
                "leaky bucket drained"
            );
        }

        if state.water < self.capacity {
            state.water += 1;
            true
        } else {
            false
        }
    }
}
