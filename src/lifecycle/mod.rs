//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (manager.rs):
//!     start hooks (registration order) → compose dispatch table
//!     → bind listener → spawn accept loop → Running
//!
//! Shutdown (manager.rs):
//!     stop accepting → drain in-flight up to grace deadline
//!     → force-terminate stragglers → stop hooks (reverse order) → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered startup: hooks first, routes composed, listener last
//! - Non-blocking start: the accept loop runs on its own task
//! - Stopped is terminal; restart means a fresh manager

pub mod hooks;
pub mod manager;

pub use hooks::{HookError, LifecycleHook};
pub use manager::{LifecycleState, RegistrationRejected, ServiceManager, StartError, StopError};
