use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration, read from command-line flags with environment
/// variable fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "throttle-guard", version, about = "Rate limited HTTP service")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind_addr: SocketAddr,

    /// Limiting strategy: token_bucket or leaky_bucket
    #[arg(long, env = "RATE_LIMIT_STRATEGY", default_value = "token_bucket")]
    pub strategy: String,

    /// Token limit or bucket capacity
    #[arg(long, env = "RATE_LIMIT", default_value_t = 100)]
    pub limit: u64,

    /// Refill or leak period per unit, e.g. "500ms" or "1s"
    #[arg(
        long,
        env = "RATE_LIMIT_INTERVAL",
        default_value = "1s",
        value_parser = humantime::parse_duration
    )]
    pub interval: Duration,

    /// Log level for the service's own targets
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            strategy: "token_bucket".to_string(),
            limit: 100,
            interval: Duration::from_secs(1),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse flags and environment, exiting with usage on bad input.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> String {
        format!("throttle_guard={},tower_http=debug", self.log_level)
    }
}
