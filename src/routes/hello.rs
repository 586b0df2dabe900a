//! Greeting route: `GET /` answers a fixed body.

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use super::{Route, HTML_UTF8};

/// Fixed greeting body.
pub const GREETING: &str = "Hello world!\n";

/// Route answering `GET /` with a fixed greeting, independent of any
/// prior request history.
#[derive(Debug, Default)]
pub struct HelloRoute;

impl Route for HelloRoute {
    fn pattern(&self) -> &str {
        "/"
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn handle(&self, _req: Request<Body>) -> BoxFuture<'static, Response> {
        Box::pin(async move { ([(header::CONTENT_TYPE, HTML_UTF8)], GREETING).into_response() })
    }
}
