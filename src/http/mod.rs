//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (accepted by the lifecycle manager's serve task)
//!     → server.rs (Axum setup, middleware, dispatch handler)
//!     → request.rs (request ID extraction/generation)
//!     → routing table lookup → route handle
//!     → Send response to client
//! ```

pub mod request;
pub mod server;

pub use request::{extract_or_generate_request_id, RequestId, X_REQUEST_ID};
pub use server::{build_router, AppState, NOT_FOUND_BODY};
