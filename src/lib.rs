//! Request admission control.
//!
//! A [`RateLimiter`] answers one question per unit of work: may it proceed
//! now? [`TokenBucket`] and [`LeakyBucket`] implement it, and
//! [`create_rate_limiter`] picks one by strategy name. The [`middleware`]
//! module puts a limiter in front of an axum router.

pub mod algorithms;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod rate_limiter;
pub mod response;
pub mod server;

pub use algorithms::{create_rate_limiter, AlgorithmConfig, LeakyBucket, Strategy, TokenBucket};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::Config;
pub use error::{Result, ThrottleError};
pub use middleware::RateLimitState;
pub use rate_limiter::RateLimiter;
pub use server::{create_app, Server};
