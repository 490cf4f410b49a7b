use std::sync::Arc;

/// Admission decision shared by every limiting strategy.
///
/// `allow` answers "may this unit of work proceed now?". It never blocks on
/// I/O and never fails; `false` means the limiter is saturated.
pub trait RateLimiter: Send + Sync {
    fn allow(&self) -> bool;
}

impl<T: RateLimiter + ?Sized> RateLimiter for Box<T> {
    fn allow(&self) -> bool {
        (**self).allow()
    }
}

impl<T: RateLimiter + ?Sized> RateLimiter for Arc<T> {
    fn allow(&self) -> bool {
        (**self).allow()
    }
}
