//! HTTP dispatch wiring.
//!
//! # Responsibilities
//! - Build the Axum router backed by the dispatch table
//! - Wire up middleware (tracing, request timeout)
//! - Resolve each request by exact (method, path) lookup
//! - Fail closed with a fixed 404 when nothing matches

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::request::extract_or_generate_request_id;
use crate::routing::DispatchTable;

/// Fixed body for unmatched requests.
pub const NOT_FOUND_BODY: &str = "Page not found\n";

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<DispatchTable>,
}

/// Build the Axum router with the dispatch table and middleware layers.
pub fn build_router(config: &ServiceConfig, table: Arc<DispatchTable>) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(AppState { table })
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

/// Span covering one request. The correlation ID is a span field so every
/// event emitted while handling the request carries it.
fn request_span(req: &Request<Body>) -> tracing::Span {
    let request_id = extract_or_generate_request_id(req.headers());
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    )
}

/// Single entry point for every inbound request.
async fn dispatch(State(state): State<AppState>, req: Request<Body>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match state.table.lookup(&method, &path) {
        Some(route) => route.handle(req).await,
        None => {
            tracing::debug!(method = %method, path = %path, "no route matched");
            (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{EchoRoute, HelloRoute, Route};
    use axum::http::Method;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let table = DispatchTable::build(vec![
            Arc::new(HelloRoute) as Arc<dyn Route>,
            Arc::new(EchoRoute),
        ])
        .unwrap();
        build_router(&ServiceConfig::default(), Arc::new(table))
    }

    #[tokio::test]
    async fn resolves_registered_route() {
        let resp = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unmatched_path_fails_closed() {
        let resp = test_app()
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], NOT_FOUND_BODY.as_bytes());
    }

    #[tokio::test]
    async fn unmatched_method_fails_closed() {
        let resp = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn request_span_carries_correlation_fields() {
        let subscriber = tracing_subscriber::fmt().finish();
        tracing::subscriber::with_default(subscriber, || {
            let req = Request::builder()
                .uri("/")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap();
            let span = request_span(&req);
            let meta = span.metadata().expect("span should be enabled");
            let fields: Vec<&str> = meta.fields().iter().map(|f| f.name()).collect();
            assert!(fields.contains(&"request_id"));
            assert!(fields.contains(&"method"));
            assert!(fields.contains(&"path"));
        });
    }

    #[tokio::test]
    async fn echo_round_trip_through_dispatch() {
        let payload = b"dispatch body".to_vec();
        let resp = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .body(Body::from(payload.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], &payload[..]);
    }
}
