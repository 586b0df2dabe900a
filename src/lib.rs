//! Minimal HTTP service scaffold.
//!
//! Independently-implemented routes are registered into a composer that
//! builds an exact-match dispatch table, wrapped with request metrics, and
//! brought up and torn down in order by a lifecycle manager that owns the
//! TCP listener.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routes;
pub mod routing;

pub use config::ServiceConfig;
pub use lifecycle::ServiceManager;
pub use observability::{MetricsRegistry, RequestMetrics};
pub use routes::Route;
pub use routing::DispatchTable;
