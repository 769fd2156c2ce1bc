//! REST ingress adapter

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use contracts::{Envelope, Outcome, TopicHandler, TransportError};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::config::IngressMetrics;
use crate::error::{IngestionError, Result};

const ADAPTER: &str = "rest";

/// JSON body returned by `POST /api/v1/processTopic`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeBody {
    pub outcome: &'static str,
    pub topic: Option<String>,
    pub detail: String,
}

struct RestState<H> {
    handler: Arc<H>,
    identity: Arc<str>,
    metrics: Arc<IngressMetrics>,
}

impl<H> Clone for RestState<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            identity: Arc::clone(&self.identity),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// HTTP status for an outcome
pub fn status_for(outcome: &Outcome) -> StatusCode {
    match outcome {
        Outcome::Delivered(_) => StatusCode::OK,
        Outcome::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Outcome::Unsupported(_) => StatusCode::NOT_FOUND,
        Outcome::Failed(TransportError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        Outcome::Failed(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Build the REST router
///
/// Routes:
/// - `POST /api/v1/processTopic` dispatches the raw JSON body
/// - `GET /api/v1/name` returns `identity`
/// - `GET /health`
pub fn rest_router<H>(
    handler: Arc<H>,
    identity: impl Into<Arc<str>>,
    metrics: Arc<IngressMetrics>,
) -> Router
where
    H: TopicHandler + Send + Sync + 'static,
{
    let state = RestState {
        handler,
        identity: identity.into(),
        metrics,
    };

    Router::new()
        .route("/api/v1/processTopic", post(process_topic::<H>))
        .route("/api/v1/name", get(name::<H>))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves
#[instrument(name = "rest_serve", skip(listener, app, shutdown))]
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "REST ingress listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(IngestionError::Serve)
}

async fn process_topic<H>(State(state): State<RestState<H>>, body: Bytes) -> Response
where
    H: TopicHandler + Send + Sync + 'static,
{
    state.metrics.record_received();
    observability::record_ingress(ADAPTER);

    let envelope = match Envelope::decode(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            state.metrics.record_decode_failure();
            observability::record_ingress_decode_failure(ADAPTER);
            warn!(error = %err, "Rejecting undecodable request");
            let body = OutcomeBody {
                outcome: "malformed",
                topic: None,
                detail: err.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let topic = envelope.topic.to_string();
    let outcome = state.handler.handle(envelope).await;
    let body = OutcomeBody {
        outcome: outcome.kind(),
        topic: Some(topic),
        detail: outcome.detail(),
    };
    (status_for(&outcome), Json(body)).into_response()
}

async fn name<H>(State(state): State<RestState<H>>) -> String
where
    H: Send + Sync + 'static,
{
    state.identity.to_string()
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use contracts::{Delivery, ValidationError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Answers by topic name
    #[derive(Default)]
    struct ScriptedHandler {
        calls: AtomicUsize,
    }

    impl TopicHandler for ScriptedHandler {
        async fn handle(&self, envelope: Envelope) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let topic = || envelope.topic.clone();
            match envelope.topic.as_str() {
                "PaymentRequest" => Outcome::Delivered(Delivery::Status(200)),
                "SeatRequest" => Outcome::Rejected(ValidationError::Invalid {
                    topic: topic(),
                    violations: vec!["$.seat: missing required property".into()],
                }),
                "MovieListRequest" => Outcome::Failed(TransportError::Timeout {
                    destination: "http://movie-service:8082/api/v1/processTopic".into(),
                    timeout_ms: 5000,
                }),
                "LoginRequest" => Outcome::Failed(TransportError::Status {
                    destination: "http://user-management-service:8086/api/v1/processTopic".into(),
                    status: 503,
                }),
                _ => Outcome::Unsupported(topic()),
            }
        }
    }

    fn app() -> (Router, Arc<ScriptedHandler>, Arc<IngressMetrics>) {
        let handler = Arc::new(ScriptedHandler::default());
        let metrics = Arc::new(IngressMetrics::new());
        let app = rest_router(
            Arc::clone(&handler),
            "This microservice is the [API-GATEWAY]!",
            Arc::clone(&metrics),
        );
        (app, handler, metrics)
    }

    async fn post_topic(app: Router, body: &'static str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::post("/api/v1/processTopic")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_delivered_is_ok() {
        let (app, _, _) = app();
        let (status, body) = post_topic(app, r#"{"topicName":"PaymentRequest","amount":12}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "delivered");
        assert_eq!(body["topic"], "PaymentRequest");
        assert_eq!(body["detail"], "status 200");
    }

    #[tokio::test]
    async fn test_outcome_status_mapping() {
        let cases = [
            (r#"{"topicName":"SeatRequest"}"#, StatusCode::UNPROCESSABLE_ENTITY, "rejected"),
            (r#"{"topicName":"BogusTopic"}"#, StatusCode::NOT_FOUND, "unsupported"),
            (r#"{"topicName":"MovieListRequest"}"#, StatusCode::GATEWAY_TIMEOUT, "failed"),
            (r#"{"topicName":"LoginRequest"}"#, StatusCode::BAD_GATEWAY, "failed"),
        ];
        for (request, expected_status, expected_kind) in cases {
            let (app, _, _) = app();
            let (status, body) = post_topic(app, request).await;
            assert_eq!(status, expected_status, "{request}");
            assert_eq!(body["outcome"], expected_kind, "{request}");
        }
    }

    #[tokio::test]
    async fn test_unsupported_detail_names_topic() {
        let (app, _, _) = app();
        let (_, body) = post_topic(app, r#"{"topicName":"BogusTopic"}"#).await;
        assert_eq!(body["detail"], "non-supported topic: BogusTopic");
    }

    #[tokio::test]
    async fn test_undecodable_body_is_bad_request() {
        for request in ["not json", r#"{"amount":1}"#, r#"{"topicName":""}"#, "[1,2]"] {
            let (app, handler, metrics) = app();
            let (status, body) = post_topic(app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{request}");
            assert_eq!(body["outcome"], "malformed");
            assert!(body["topic"].is_null());
            assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
            assert_eq!(metrics.snapshot().decode_failures, 1);
        }
    }

    #[tokio::test]
    async fn test_name_returns_identity() {
        let (app, _, _) = app();
        let response = app
            .oneshot(Request::get("/api/v1/name").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"This microservice is the [API-GATEWAY]!");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (app, _, _) = app();
        let response = app
            .oneshot(Request::get("/api/v2/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
