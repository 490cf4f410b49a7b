use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Point-in-time view of the admission counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleMetrics {
    pub total_requests: u64,
    pub allowed_requests: u64,
    pub throttled_requests: u64,
    pub last_reset: u64,
}

/// Lock-free admission counters shared by every request task.
#[derive(Debug)]
pub struct AdmissionMetrics {
    allowed: AtomicU64,
    throttled: AtomicU64,
    last_reset: AtomicU64,
}

impl Default for AdmissionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionMetrics {
    pub fn new() -> Self {
        Self {
            allowed: AtomicU64::new(0),
            throttled: AtomicU64::new(0),
            last_reset: AtomicU64::new(unix_now()),
        }
    }

    pub fn record(&self, allowed: bool) {
        let counter = if allowed { &self.allowed } else { &self.throttled };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ThrottleMetrics {
        let allowed_requests = self.allowed.load(Ordering::Relaxed);
        let throttled_requests = self.throttled.load(Ordering::Relaxed);

        ThrottleMetrics {
            total_requests: allowed_requests + throttled_requests,
            allowed_requests,
            throttled_requests,
            last_reset: self.last_reset.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.allowed.store(0, Ordering::Relaxed);
        self.throttled.store(0, Ordering::Relaxed);
        self.last_reset.store(unix_now(), Ordering::Relaxed);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
