//! Rate limiting algorithms
//!
//! Token bucket and leaky bucket implementations of [`RateLimiter`], plus the
//! strategy selection used to build one by name.

pub mod leaky_bucket;
pub mod token_bucket;

pub use leaky_bucket::LeakyBucket;
pub use token_bucket::TokenBucket;

use crate::error::{Result, ThrottleError};
use crate::rate_limiter::RateLimiter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported limiting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TokenBucket,
    LeakyBucket,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::TokenBucket => "token_bucket",
            Strategy::LeakyBucket => "leaky_bucket",
        }
    }

    /// Build a limiter for this strategy. `limit` is the token limit or the
    /// bucket capacity; `interval` is the refill or leak period per unit.
    pub fn build(self, limit: u64, interval: Duration) -> Box<dyn RateLimiter> {
        match self {
            Strategy::TokenBucket => Box::new(TokenBucket::new(limit, interval)),
            Strategy::LeakyBucket => Box::new(LeakyBucket::new(limit, interval)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ThrottleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "token_bucket" => Ok(Strategy::TokenBucket),
            "leaky_bucket" => Ok(Strategy::LeakyBucket),
            other => Err(ThrottleError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Create a rate limiter from a strategy name.
///
/// Fails with [`ThrottleError::UnknownStrategy`] for anything other than
/// `token_bucket` or `leaky_bucket`.
pub fn create_rate_limiter(
    strategy: &str,
    limit: u64,
    interval: Duration,
) -> Result<Box<dyn RateLimiter>> {
    let strategy: Strategy = strategy.parse()?;
    tracing::debug!(%strategy, limit, ?interval, "creating rate limiter");
    Ok(strategy.build(limit, interval))
}

/// Serializable limiter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    pub strategy: Strategy,
    pub limit: u64,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::TokenBucket,
            limit: 100,
            interval: Duration::from_secs(1),
        }
    }
}

impl AlgorithmConfig {
    pub fn build(&self) -> Box<dyn RateLimiter> {
        self.strategy.build(self.limit, self.interval)
    }
}

/// Number of whole `period`s contained in `elapsed`.
///
/// A zero period counts as an unbounded number of periods; callers clamp.
pub(crate) fn whole_periods(elapsed: Duration, period: Duration) -> u128 {
    elapsed
        .as_nanos()
        .checked_div(period.as_nanos())
        .unwrap_or(u128::MAX)
}
