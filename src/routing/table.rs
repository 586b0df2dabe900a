//! Dispatch table construction and lookup.
//!
//! # Responsibilities
//! - Build the (method, pattern) → route table once from the full route set
//! - Reject duplicate route identities at composition time
//! - Resolve incoming requests by exact match, or report an explicit miss
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact matching only: no prefixes, no wildcards, no method fallthrough
//! - Explicit `None` on miss rather than a silent default; the HTTP layer
//!   turns it into the fixed 404

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::routes::Route;

/// Error type for route composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Two routes share the same (method, pattern) identity.
    #[error("duplicate route: {method} {pattern}")]
    DuplicateRoute { method: Method, pattern: String },
}

/// Immutable mapping from (method, pattern) to route.
///
/// A pure function of the route set at composition time. Rebuilding
/// requires a fresh lifecycle manager.
pub struct DispatchTable {
    entries: HashMap<(Method, String), Arc<dyn Route>>,
}

impl DispatchTable {
    /// Build the table from the registered route set.
    ///
    /// Iterates the set once and fails fast on the first identity
    /// collision; no table is produced in that case.
    pub fn build(routes: Vec<Arc<dyn Route>>) -> Result<Self, ComposeError> {
        let mut entries = HashMap::with_capacity(routes.len());
        for route in routes {
            let key = (route.method(), route.pattern().to_string());
            if entries.contains_key(&key) {
                return Err(ComposeError::DuplicateRoute {
                    method: key.0,
                    pattern: key.1,
                });
            }
            entries.insert(key, route);
        }
        Ok(Self { entries })
    }

    /// Look up the route for (method, path). Exact match only.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Arc<dyn Route>> {
        self.entries.get(&(method.clone(), path.to_string()))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
