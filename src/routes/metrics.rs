//! Metrics exposition route: `GET /metrics` for external scraping.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::observability::MetricsRegistry;
use crate::routes::Route;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Route serializing all registered instruments in Prometheus
/// exposition format.
pub struct MetricsRoute {
    registry: Arc<MetricsRegistry>,
}

impl MetricsRoute {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }
}

impl Route for MetricsRoute {
    fn pattern(&self) -> &str {
        "/metrics"
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn handle(&self, _req: Request<Body>) -> BoxFuture<'static, Response> {
        let registry = self.registry.clone();
        Box::pin(async move {
            let body = registry.render();
            ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response()
        })
    }
}
