use thiserror::Error;

/// Errors surfaced while building a limiter or running the server.
///
/// Denial is not an error: `RateLimiter::allow` returning `false` is the
/// normal saturation signal.
#[derive(Debug, Error)]
pub enum ThrottleError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ThrottleError>;
