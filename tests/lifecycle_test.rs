//! Shutdown behavior: draining, grace deadlines, and connection refusal.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use hello_service::routes::{HelloRoute, Route};

mod common;

/// Route that holds its response for `delay`, for exercising the drain path.
struct SlowRoute {
    delay: Duration,
}

impl Route for SlowRoute {
    fn pattern(&self) -> &str {
        "/slow"
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn handle(&self, _req: Request<Body>) -> BoxFuture<'static, Response> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            "done".into_response()
        })
    }
}

#[tokio::test]
async fn stop_drains_in_flight_requests_within_grace() {
    let (mut manager, addr) = common::start_service_with(vec![
        Arc::new(HelloRoute) as Arc<dyn Route>,
        Arc::new(SlowRoute {
            delay: Duration::from_millis(400),
        }),
    ])
    .await;

    let in_flight = tokio::spawn(async move {
        reqwest::Client::new()
            .get(format!("http://{}/slow", addr))
            .send()
            .await
    });

    // Let the request reach the handler before stopping.
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.stop(Duration::from_secs(5)).await.unwrap();

    let resp = in_flight.await.unwrap().unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "done");
}

#[tokio::test]
async fn stop_terminates_requests_past_the_grace_deadline() {
    let (mut manager, addr) = common::start_service_with(vec![Arc::new(SlowRoute {
        delay: Duration::from_secs(10),
    }) as Arc<dyn Route>])
    .await;

    let in_flight = tokio::spawn(async move {
        reqwest::Client::new()
            .get(format!("http://{}/slow", addr))
            .send()
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let stop_started = std::time::Instant::now();
    let stopped = manager.stop(Duration::from_millis(200)).await;
    assert!(matches!(
        stopped,
        Err(hello_service::lifecycle::StopError::GraceExpired)
    ));
    // Stop must not wait out the 10s handler.
    assert!(stop_started.elapsed() < Duration::from_secs(2));

    // The connection is severed at the deadline; the client never sees a
    // successful response, even long after stop returned.
    let result = tokio::time::timeout(Duration::from_secs(3), in_flight)
        .await
        .expect("request should fail promptly after forced termination")
        .unwrap();
    assert!(result.is_err() || !result.unwrap().status().is_success());
}

#[tokio::test]
async fn stopped_service_refuses_new_connections() {
    let (mut manager, addr) =
        common::start_service_with(vec![Arc::new(HelloRoute) as Arc<dyn Route>]).await;

    manager.stop(Duration::from_secs(1)).await.unwrap();

    let connect = tokio::net::TcpStream::connect(addr).await;
    assert!(connect.is_err());
}
