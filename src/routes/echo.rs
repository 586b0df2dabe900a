//! Echo route: `POST /` copies the request body to the response verbatim.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use super::{Route, HTML_UTF8};

/// Route answering `POST /` by echoing the full request body,
/// byte-for-byte, with no transformation and no size limit.
#[derive(Debug, Default)]
pub struct EchoRoute;

impl Route for EchoRoute {
    fn pattern(&self) -> &str {
        "/"
    }

    fn method(&self) -> Method {
        Method::POST
    }

    fn handle(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        Box::pin(async move {
            match axum::body::to_bytes(req.into_body(), usize::MAX).await {
                Ok(bytes) => ([(header::CONTENT_TYPE, HTML_UTF8)], bytes).into_response(),
                Err(e) => {
                    // Local to this request; the listener and sibling
                    // requests are unaffected.
                    tracing::warn!(error = %e, "failed to read echo body");
                    StatusCode::BAD_REQUEST.into_response()
                }
            }
        })
    }
}
