//! Request handlers exposed through the route contract.
//!
//! # Design Decisions
//! - Routes are stateless beyond injected collaborators and immutable
//!   after construction; identity is the (method, pattern) pair
//! - The composition engine only sees the three-method contract below,
//!   never the handler bodies
//! - `handle` returns a boxed future so routes stay object-safe and can
//!   be stored behind `Arc<dyn Route>` in the dispatch table

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;

pub mod echo;
pub mod hello;
pub mod metrics;

pub use echo::EchoRoute;
pub use hello::HelloRoute;
pub use metrics::MetricsRoute;

/// Content type every scaffold response carries.
pub(crate) const HTML_UTF8: &str = "text/html; charset=utf-8";

/// A unit of behavior bound to an HTTP method and path pattern.
pub trait Route: Send + Sync {
    /// Path pattern this route answers on (exact match).
    fn pattern(&self) -> &str;

    /// HTTP method this route answers to.
    fn method(&self) -> Method;

    /// Produce a response for the request.
    fn handle(&self, req: Request<Body>) -> BoxFuture<'static, Response>;
}
