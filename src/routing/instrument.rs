//! Instrumented dispatch wrapper.
//!
//! Wraps a route's handle function with timing and counting side effects
//! without altering its observable response. Any problem while recording
//! is logged and swallowed; it never reaches the caller.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::observability::RequestMetrics;
use crate::routes::Route;

/// Per-request ephemeral data, created at dispatch entry and consumed
/// once the wrapped route has produced its response.
pub struct RequestContext {
    method: Method,
    pattern: String,
    start: Instant,
}

impl RequestContext {
    fn begin(method: Method, pattern: &str) -> Self {
        Self {
            method,
            pattern: pattern.to_string(),
            start: Instant::now(),
        }
    }

    /// Record the finished request into the instruments and discard
    /// the context.
    fn record(self, status: StatusCode, metrics: &RequestMetrics) {
        let elapsed = self.start.elapsed().as_secs_f64();
        metrics.duration.observe(elapsed, &[self.pattern.as_str()]);
        metrics.requests.increment(&[
            self.pattern.as_str(),
            self.method.as_str(),
            status.as_str(),
        ]);
    }
}

/// A route wrapped with request counting and duration timing.
pub struct InstrumentedRoute {
    inner: Arc<dyn Route>,
    metrics: Option<RequestMetrics>,
}

impl InstrumentedRoute {
    /// Wrap a route. With `None` metrics the wrapper is a passthrough.
    pub fn new(inner: Arc<dyn Route>, metrics: Option<RequestMetrics>) -> Self {
        Self { inner, metrics }
    }
}

impl Route for InstrumentedRoute {
    fn pattern(&self) -> &str {
        self.inner.pattern()
    }

    fn method(&self) -> Method {
        self.inner.method()
    }

    fn handle(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        let ctx = RequestContext::begin(self.inner.method(), self.inner.pattern());
        let fut = self.inner.handle(req);
        let metrics = self.metrics.clone();
        Box::pin(async move {
            let response = fut.await;
            if let Some(metrics) = &metrics {
                ctx.record(response.status(), metrics);
            }
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MetricsRegistry;
    use crate::routes::HelloRoute;

    #[tokio::test]
    async fn response_passes_through_unmodified() {
        let registry = MetricsRegistry::new();
        let metrics = RequestMetrics::register(&registry).unwrap();

        let route = InstrumentedRoute::new(Arc::new(HelloRoute), Some(metrics));
        assert_eq!(route.pattern(), "/");
        assert_eq!(route.method(), Method::GET);

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = route.handle(req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], crate::routes::hello::GREETING.as_bytes());
    }

    #[tokio::test]
    async fn records_counter_and_duration() {
        let registry = MetricsRegistry::new();
        let metrics = RequestMetrics::register(&registry).unwrap();

        let route = InstrumentedRoute::new(Arc::new(HelloRoute), Some(metrics));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        route.handle(req).await;

        let out = registry.render();
        assert!(out.contains("http_requests_total"));
        assert!(out.contains("method=\"GET\""));
        assert!(out.contains("status=\"200\""));
        assert!(out.contains("http_requests_duration_seconds"));
    }

    #[tokio::test]
    async fn works_without_metrics() {
        let route = InstrumentedRoute::new(Arc::new(HelloRoute), None);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = route.handle(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
