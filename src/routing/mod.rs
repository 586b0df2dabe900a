//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Composition (at startup):
//!     registered routes
//!     → instrument.rs (wrap with counting/timing)
//!     → table.rs (build (method, pattern) → route map, reject duplicates)
//!     → Freeze as immutable DispatchTable
//!
//! Incoming Request (method, path):
//!     → table.rs (exact lookup)
//!     → Return: matched route or explicit no-match (404 upstream)
//! ```
//!
//! # Design Decisions
//! - Table compiled once at startup, immutable at runtime
//! - Deterministic: same (method, path) always resolves the same route
//! - Fail closed: unmatched requests never reach a handler

pub mod instrument;
pub mod table;

pub use instrument::InstrumentedRoute;
pub use table::{ComposeError, DispatchTable};
