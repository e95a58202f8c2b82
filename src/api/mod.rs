//! HTTP trigger endpoint
//!
//! The event-delivery platform POSTs one event per request. The response code
//! is the only thing it sees: 2xx acknowledges the event, anything else marks
//! the invocation as failed and leaves redelivery to the platform.

use crate::command::CommandRelay;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use echo_relay_shared::{RelayError, TriggerEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Error response for a failed invocation
struct InvocationError(RelayError);

impl IntoResponse for InvocationError {
    fn into_response(self) -> Response {
        let status = if self.0.is_malformed_event() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        (status, self.0.to_string()).into_response()
    }
}

async fn handle_event(
    State(relay): State<Arc<CommandRelay>>,
    Json(event): Json<TriggerEvent>,
) -> Result<StatusCode, InvocationError> {
    relay
        .relay(event.message())
        .await
        .map_err(InvocationError)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Build the trigger router around a relay
pub fn router(relay: Arc<CommandRelay>) -> Router {
    Router::new()
        .route("/", post(handle_event))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

/// Serve the trigger endpoint until a shutdown signal arrives
pub async fn serve(relay: Arc<CommandRelay>, port: u16) -> anyhow::Result<()> {
    let listen_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Trigger endpoint listening on {}", listen_addr);

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Trigger endpoint stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::traits::MockDeviceManager;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use echo_relay_shared::codec::{decode_payload, encode_payload};
    use echo_relay_shared::DownstreamError;
    use tower::ServiceExt;

    fn event_body(attributes: serde_json::Value, data: &str) -> String {
        serde_json::json!({
            "specversion": "1.0",
            "id": "42",
            "data": {
                "message": {"attributes": attributes, "data": data, "messageId": "42"},
                "subscription": "projects/p1/subscriptions/relay"
            }
        })
        .to_string()
    }

    fn full_attributes() -> serde_json::Value {
        serde_json::json!({
            "deviceId": "d1",
            "deviceRegistryId": "r1",
            "projectId": "p1",
            "deviceRegistryLocation": "us-central1"
        })
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn app(devices: MockDeviceManager) -> Router {
        router(Arc::new(CommandRelay::new(Arc::new(devices))))
    }

    fn rejecting() -> MockDeviceManager {
        let mut devices = MockDeviceManager::new();
        devices.expect_send_command().never();
        devices
    }

    #[tokio::test]
    async fn test_cloud_event_is_relayed() {
        let mut devices = MockDeviceManager::new();
        devices
            .expect_send_command()
            .withf(|request| {
                request.name == "projects/p1/locations/us-central1/registries/r1/devices/d1"
                    && decode_payload(&request.binary_data).as_deref() == Ok("hello ack")
            })
            .times(1)
            .returning(|_| Ok(()));

        let body = event_body(full_attributes(), &encode_payload("hello"));
        let response = app(devices).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_push_envelope_is_relayed() {
        let mut devices = MockDeviceManager::new();
        devices.expect_send_command().times(1).returning(|_| Ok(()));

        let body = serde_json::json!({
            "message": {"attributes": full_attributes(), "data": encode_payload("ping")}
        })
        .to_string();
        let response = app(devices).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_missing_attribute_is_bad_request() {
        let attributes = serde_json::json!({
            "deviceId": "d1",
            "deviceRegistryId": "r1",
            "projectId": "p1"
        });
        let body = event_body(attributes, &encode_payload("hello"));

        let response = app(rejecting()).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&text).unwrap(),
            "Missing required attribute: deviceRegistryLocation"
        );
    }

    #[tokio::test]
    async fn test_path_escaping_attribute_is_bad_request() {
        let mut attributes = full_attributes();
        attributes["deviceId"] = serde_json::json!("../../../../../x");
        let body = event_body(attributes, &encode_payload("hello"));

        let response = app(rejecting()).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_payload_is_bad_request() {
        let body = event_body(full_attributes(), "***");
        let response = app(rejecting()).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_downstream_failure_is_bad_gateway() {
        let mut devices = MockDeviceManager::new();
        devices
            .expect_send_command()
            .times(1)
            .returning(|_| Err(DownstreamError::Transport("connection refused".into())));
        devices.expect_name().return_const("mock");

        let body = event_body(full_attributes(), &encode_payload("hello"));
        let response = app(devices).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_rejected() {
        let response = app(rejecting())
            .oneshot(post("{\"hello\": \"world\"}".into()))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_healthz() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = app(rejecting()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
