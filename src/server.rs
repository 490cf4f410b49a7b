use crate::algorithms::create_rate_limiter;
use crate::config::Config;
use crate::error::{Result, ThrottleError};
use crate::handlers::{health_check, metrics_snapshot, root, AppState};
use crate::middleware::RateLimitState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct Server {
    app: Router,
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Result<Self> {
        let app = create_app(&config)?;
        Ok(Self { app, config })
    }

    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            %addr,
            strategy = %self.config.strategy,
            limit = self.config.limit,
            interval = ?self.config.interval,
            "Throttle guard listening"
        );
        tracing::info!("Health check available at /health");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Build the application router. Only `/` sits behind the limiter;
/// `/health` and `/metrics` are never throttled.
pub fn create_app(config: &Config) -> Result<Router> {
    if config.interval.is_zero() {
        return Err(ThrottleError::Configuration(
            "rate limit interval must be greater than zero".to_string(),
        ));
    }

    let limiter = create_rate_limiter(&config.strategy, config.limit, config.interval)?;
    if config.limit == 0 {
        tracing::warn!("Rate limit is 0; every request to a limited route will be rejected");
    }

    let rate_limit = RateLimitState::from_limiter(Arc::from(limiter));
    let state = AppState {
        strategy: config.strategy.clone(),
        limit: config.limit,
        metrics: rate_limit.metrics(),
    };

    let limited = rate_limit.layer(Router::new().route("/", get(root)));
    let open = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_snapshot))
        .with_state(state);

    Ok(limited.merge(open).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
