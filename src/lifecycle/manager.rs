//! Service lifecycle manager.
//!
//! Owns the network listener and coordinates ordered startup and graceful
//! shutdown around it.
//!
//! # State machine
//! ```text
//! Idle → Starting → Running → Stopping → Stopped
//!          │ (hook/compose/bind failure)           ▲
//!          └──────────────────────────────────────┘
//! ```
//! Stopped is terminal; serving again requires a fresh manager.
//!
//! # Connection ownership
//! The accept loop spawns one task per connection and keeps every handle
//! in a `JoinSet` it owns. Graceful shutdown signals each connection to
//! finish its in-flight requests and close; if the grace deadline expires
//! first, aborting the accept-loop task drops the `JoinSet`, which aborts
//! every remaining connection task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::Request;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tower::ServiceExt;

use crate::config::ServiceConfig;
use crate::http::build_router;
use crate::lifecycle::hooks::{HookError, LifecycleHook};
use crate::observability::RequestMetrics;
use crate::routes::Route;
use crate::routing::{ComposeError, DispatchTable, InstrumentedRoute};

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Error type for `start`.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("service is not idle (state: {0:?})")]
    NotIdle(LifecycleState),

    #[error("start hook {name:?} failed")]
    Hook {
        name: String,
        #[source]
        source: HookError,
    },

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Error type for `stop`.
#[derive(Debug, Error)]
pub enum StopError {
    #[error("service is not running (state: {0:?})")]
    NotRunning(LifecycleState),

    #[error("grace deadline expired; outstanding requests were terminated")]
    GraceExpired,
}

/// Error type for registration calls.
#[derive(Debug, Error)]
#[error("registration rejected after start (state: {0:?})")]
pub struct RegistrationRejected(LifecycleState);

/// Coordinates startup and shutdown of the service.
///
/// Routes and hooks are registered while Idle. `start` composes the
/// dispatch table, binds the listener, and spawns the accept loop on its
/// own task; `stop` stops accepting, drains in-flight requests up to the
/// grace deadline, and runs stop hooks in reverse registration order.
pub struct ServiceManager {
    config: ServiceConfig,
    metrics: Option<RequestMetrics>,
    routes: Vec<Arc<dyn Route>>,
    hooks: Vec<Arc<dyn LifecycleHook>>,
    state: LifecycleState,
    shutdown_tx: watch::Sender<bool>,
    serve: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl ServiceManager {
    /// Create an idle manager. With `Some(metrics)` every registered route
    /// is wrapped with request counting and timing at composition.
    pub fn new(config: ServiceConfig, metrics: Option<RequestMetrics>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            metrics,
            routes: Vec::new(),
            hooks: Vec::new(),
            state: LifecycleState::Idle,
            shutdown_tx,
            serve: None,
            local_addr: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Address the listener is bound to, once Running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Register a route. Rejected once `start` has been called.
    pub fn register_route(&mut self, route: Arc<dyn Route>) -> Result<(), RegistrationRejected> {
        if self.state != LifecycleState::Idle {
            return Err(RegistrationRejected(self.state));
        }
        self.routes.push(route);
        Ok(())
    }

    /// Register a lifecycle hook. Rejected once `start` has been called.
    pub fn register_hook(
        &mut self,
        hook: Arc<dyn LifecycleHook>,
    ) -> Result<(), RegistrationRejected> {
        if self.state != LifecycleState::Idle {
            return Err(RegistrationRejected(self.state));
        }
        self.hooks.push(hook);
        Ok(())
    }

    /// Start the service: run start hooks in registration order, compose
    /// the dispatch table, bind the listener, and begin accepting on a
    /// dedicated task. Returns as soon as the accept loop is running.
    ///
    /// Any failure is fatal and leaves the manager Stopped.
    pub async fn start(&mut self) -> Result<(), StartError> {
        if self.state != LifecycleState::Idle {
            return Err(StartError::NotIdle(self.state));
        }
        self.state = LifecycleState::Starting;

        for hook in &self.hooks {
            tracing::debug!(hook = hook.name(), "running start hook");
            if let Err(source) = hook.on_start() {
                self.state = LifecycleState::Stopped;
                return Err(StartError::Hook {
                    name: hook.name().to_string(),
                    source,
                });
            }
        }

        let wrapped: Vec<Arc<dyn Route>> = self
            .routes
            .iter()
            .cloned()
            .map(|route| {
                Arc::new(InstrumentedRoute::new(route, self.metrics.clone())) as Arc<dyn Route>
            })
            .collect();

        let table = match DispatchTable::build(wrapped) {
            Ok(table) => Arc::new(table),
            Err(e) => {
                self.state = LifecycleState::Stopped;
                return Err(e.into());
            }
        };

        let addr = self.config.listener.bind_address.clone();
        let listener = match TcpListener::bind(addr.as_str()).await {
            Ok(listener) => listener,
            Err(source) => {
                self.state = LifecycleState::Stopped;
                return Err(StartError::Bind { addr, source });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(local_addr) => local_addr,
            Err(source) => {
                self.state = LifecycleState::Stopped;
                return Err(StartError::Bind { addr, source });
            }
        };
        self.local_addr = Some(local_addr);

        let app = build_router(&self.config, table);
        let accept_shutdown = self.shutdown_tx.subscribe();
        let serve = tokio::spawn(accept_loop(listener, app, accept_shutdown));
        self.serve = Some(serve);
        self.state = LifecycleState::Running;

        tracing::info!(
            address = %local_addr,
            routes = self.routes.len(),
            hooks = self.hooks.len(),
            "service started"
        );
        Ok(())
    }

    /// Stop the service: the listener stops accepting immediately,
    /// in-flight requests may finish within `grace`, and stop hooks run
    /// in reverse registration order with the remaining budget.
    ///
    /// Requests still outstanding after the deadline are forcibly
    /// terminated, reported as `GraceExpired` after the hooks have run.
    pub async fn stop(&mut self, grace: Duration) -> Result<(), StopError> {
        if self.state != LifecycleState::Running {
            return Err(StopError::NotRunning(self.state));
        }
        self.state = LifecycleState::Stopping;
        tracing::info!(grace_secs = grace.as_secs(), "stopping service");

        let stop_started = Instant::now();
        let _ = self.shutdown_tx.send(true);

        let mut forced = false;
        if let Some(mut serve) = self.serve.take() {
            match tokio::time::timeout(grace, &mut serve).await {
                Ok(Ok(())) => tracing::debug!("accept loop drained"),
                Ok(Err(e)) => tracing::error!(error = %e, "accept loop panicked"),
                Err(_) => {
                    tracing::warn!("grace deadline expired, terminating outstanding requests");
                    // Dropping the accept loop drops its JoinSet, which
                    // aborts every remaining connection task.
                    serve.abort();
                    let _ = serve.await;
                    forced = true;
                }
            }
        }

        for hook in self.hooks.iter().rev() {
            let remaining = grace.saturating_sub(stop_started.elapsed());
            tracing::debug!(
                hook = hook.name(),
                remaining_ms = remaining.as_millis() as u64,
                "running stop hook"
            );
            if let Err(e) = hook.on_stop(remaining) {
                tracing::warn!(hook = hook.name(), error = %e, "stop hook failed");
            }
        }

        self.state = LifecycleState::Stopped;
        tracing::info!("service stopped");

        if forced {
            Err(StopError::GraceExpired)
        } else {
            Ok(())
        }
    }
}

/// Accept connections until shutdown is signaled, then drain.
///
/// Each connection runs on its own task, owned by this loop's `JoinSet`.
/// On shutdown the listener is dropped at once (no new connections) and
/// every live connection is asked to finish in-flight requests and close.
async fn accept_loop(
    listener: TcpListener,
    app: axum::Router,
    mut accept_shutdown: watch::Receiver<bool>,
) {
    let conn_shutdown = accept_shutdown.clone();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = accept_shutdown.wait_for(|stop| *stop) => break,
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                tracing::debug!(peer_addr = %peer_addr, "connection accepted");
                connections.spawn(serve_connection(
                    stream,
                    app.clone(),
                    conn_shutdown.clone(),
                ));
            }
        }
    }

    // Stop accepting immediately; in-flight connections drain below.
    drop(listener);
    tracing::debug!(
        connections = connections.len(),
        "listener closed, draining connections"
    );
    while connections.join_next().await.is_some() {}
}

/// Serve one connection, honoring the shutdown signal.
async fn serve_connection(
    stream: tokio::net::TcpStream,
    app: axum::Router,
    mut shutdown: watch::Receiver<bool>,
) {
    let socket = TokioIo::new(stream);
    let hyper_service = service_fn(move |request: Request<Incoming>| {
        app.clone().oneshot(request.map(Body::new))
    });

    let builder = ConnectionBuilder::new(TokioExecutor::new());
    let conn = builder.serve_connection(socket, hyper_service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                tracing::debug!(error = %e, "connection closed with error");
            }
        }
        // Discard the returned `watch::Ref` inside the future so the
        // non-`Send` guard is not held across the await below.
        _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => {
            // Finish in-flight requests, close idle keep-alives.
            conn.as_mut().graceful_shutdown();
            if let Err(e) = conn.as_mut().await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        }
    }
}
