use crate::algorithms::create_rate_limiter;
use crate::error::Result;
use crate::metrics::AdmissionMetrics;
use crate::rate_limiter::RateLimiter;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::Arc;
use std::time::Duration;

pub const RATE_LIMIT_EXCEEDED_BODY: &str = "Too many requests";

/// Shared state for the rate limiting middleware
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<dyn RateLimiter>,
    metrics: Arc<AdmissionMetrics>,
}

impl RateLimitState {
    /// Build the limiter named by `strategy`. An unknown strategy fails here,
    /// before any middleware exists.
    pub fn new(strategy: &str, limit: u64, interval: Duration) -> Result<Self> {
        let limiter = create_rate_limiter(strategy, limit, interval)?;
        Ok(Self::from_limiter(Arc::from(limiter)))
    }

    pub fn from_limiter(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            limiter,
            metrics: Arc::new(AdmissionMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<AdmissionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Wrap every route currently on `router` with the admission check.
    pub fn layer<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self, rate_limit_middleware))
    }
}

/// Admission check that runs before the wrapped handlers.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let allowed = state.limiter.allow();
    state.metrics.record(allowed);

    if allowed {
        return next.run(request).await;
    }

    tracing::debug!(
        target: "throttle_guard::middleware",
        method = %request.method(),
        uri = %request.uri(),
        "Request rejected: rate limit exceeded"
    );

    too_many_requests()
}

fn too_many_requests() -> Response {
    let mut response = Response::new(Body::from(RATE_LIMIT_EXCEEDED_BODY));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::TokenBucket;
    use crate::clock::MockClock;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn request() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[test]
    fn test_unknown_strategy_builds_no_state() {
        assert!(RateLimitState::new("fixed_window", 1, Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_denied_request_skips_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "Success"
                }
            }),
        );

        let limiter = TokenBucket::with_clock(1, Duration::from_secs(1), MockClock::default());
        let state = RateLimitState::from_limiter(Arc::new(limiter));
        let metrics = state.metrics();
        let app = state.layer(router);

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            second.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = second.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], RATE_LIMIT_EXCEEDED_BODY.as_bytes());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.allowed_requests, 1);
        assert_eq!(snapshot.throttled_requests, 1);
    }
}
