//! Lifecycle hooks for coordinated resource setup and teardown.

use std::time::Duration;

use thiserror::Error;

/// Error produced by a hook body.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A pair of callbacks invoked at service start and stop.
///
/// The manager calls `on_start` in registration order and `on_stop` in
/// reverse registration order, each at most once per phase. Implementations
/// must be idempotent under that discipline.
pub trait LifecycleHook: Send + Sync {
    /// Hook name used in logs.
    fn name(&self) -> &str;

    /// Invoked during startup, before the listener binds.
    fn on_start(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Invoked during shutdown with the remaining grace budget.
    fn on_stop(&self, _remaining: Duration) -> Result<(), HookError> {
        Ok(())
    }
}
