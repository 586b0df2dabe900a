//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → tracing events (structured log fields)
//!     → metrics.rs (counters, histograms via the registry)
//!
//! Consumers:
//!     → Log aggregation (stdout via tracing-subscriber)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments through the `metrics` crate)
//! - The registry is an explicit instance, not process-global state
//! - Recording failures never propagate into the request path

pub mod metrics;

pub use metrics::{CounterHandle, HistogramHandle, MetricsError, MetricsRegistry, RequestMetrics};
