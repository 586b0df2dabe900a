//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use hello_service::config::ServiceConfig;
use hello_service::lifecycle::ServiceManager;
use hello_service::observability::{MetricsRegistry, RequestMetrics};
use hello_service::routes::{EchoRoute, HelloRoute, MetricsRoute, Route};

/// Config bound to an ephemeral port.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Start a service with the standard route set (greeting, echo, metrics)
/// on an ephemeral port.
#[allow(dead_code)]
pub async fn start_default_service() -> (ServiceManager, SocketAddr, Arc<MetricsRegistry>) {
    let registry = Arc::new(MetricsRegistry::new());
    let metrics = RequestMetrics::register(&registry).unwrap();

    let mut manager = ServiceManager::new(test_config(), Some(metrics));
    manager.register_route(Arc::new(HelloRoute)).unwrap();
    manager.register_route(Arc::new(EchoRoute)).unwrap();
    manager
        .register_route(Arc::new(MetricsRoute::new(registry.clone())))
        .unwrap();
    manager.start().await.unwrap();

    let addr = manager.local_addr().unwrap();
    (manager, addr, registry)
}

/// Start a service with an arbitrary route set and no metrics.
#[allow(dead_code)]
pub async fn start_service_with(routes: Vec<Arc<dyn Route>>) -> (ServiceManager, SocketAddr) {
    let mut manager = ServiceManager::new(test_config(), None);
    for route in routes {
        manager.register_route(route).unwrap();
    }
    manager.start().await.unwrap();
    let addr = manager.local_addr().unwrap();
    (manager, addr)
}
