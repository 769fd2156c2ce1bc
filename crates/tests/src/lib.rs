//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Shipped configuration and schema snapshot checks
//! - Router e2e against in-process downstream services and the in-process bus
//! - REST and bus ingress driving the same router

#[cfg(test)]
mod contract_tests {
    use std::path::PathBuf;

    use config_loader::ConfigLoader;
    use contracts::{BusBackend, TopicName, TransportKind};
    use schema::SchemaStore;

    fn repo_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let blueprint = ConfigLoader::load_from_path(&repo_root().join("gateway.toml")).unwrap();

        assert_eq!(blueprint.service.identity, "This microservice is the [API-GATEWAY]!");
        assert_eq!(blueprint.routes.len(), 12);
        assert!(config_loader::duplicate_route_topics(&blueprint).is_empty());

        let login = blueprint.route_for("LoginRequest").unwrap();
        assert_eq!(login.transport, TransportKind::SyncCall);
        assert_eq!(
            login.destination,
            "http://user-management-service:8086/api/v1/processTopic"
        );

        let ticket = blueprint.route_for("MovieTicketResponse").unwrap();
        assert_eq!(ticket.transport, TransportKind::AsyncPublish);
        assert_eq!(ticket.destination, "MovieTicketResponse");

        assert!(blueprint
            .consumed_topics()
            .contains(&TopicName::from("MovieListRequest")));

        assert_eq!(blueprint.bus.backend, BusBackend::Channel);
        assert_eq!(blueprint.bus.kafka.bootstrap_servers, "kafka:9092");
    }

    #[test]
    fn test_every_shipped_route_has_a_schema() {
        let root = repo_root();
        let blueprint = ConfigLoader::load_from_path(&root.join("gateway.toml")).unwrap();
        let store = SchemaStore::load(root.join(&blueprint.schema.dir)).unwrap();

        for route in &blueprint.routes {
            assert!(
                store.get(&route.topic).is_some(),
                "missing schema for {}",
                route.topic
            );
        }
        assert_eq!(store.len(), blueprint.routes.len());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use axum::{
        body::{to_bytes, Body, Bytes as AxumBytes},
        extract::State,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use bus::{ChannelBus, ChannelSubscription};
    use bytes::Bytes;
    use contracts::{
        BusConsumer, BusMessage, BusPublisher, Delivery, Envelope, HttpConfig, Outcome,
        TopicHandler, TransportError, TransportKind, ValidationError,
    };
    use dispatcher::{BusPublishExecutor, DispatchRouter, HttpCallExecutor, TransportRegistry};
    use ingestion::{rest_router, BusIngress, FailurePolicy, IngressMetrics};
    use schema::JsonSchemaValidator;
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    type GatewayRouter =
        DispatchRouter<JsonSchemaValidator, HttpCallExecutor, BusPublishExecutor<ChannelBus>>;

    /// Bodies received by a mock downstream service
    type Received = Arc<Mutex<Vec<AxumBytes>>>;

    /// Mock downstream service on an ephemeral port
    async fn downstream(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route(
                "/api/v1/processTopic",
                post(move |State(received): State<Received>, body: AxumBytes| async move {
                    received.lock().unwrap().push(body);
                    status
                }),
            )
            .with_state(Arc::clone(&received));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api/v1/processTopic"), received)
    }

    fn validator() -> JsonSchemaValidator {
        let record = |topic: &str| {
            json!({
                "type": "object",
                "required": ["topicName", "correlationId"],
                "properties": {
                    "topicName": { "const": topic },
                    "correlationId": { "type": "string", "minLength": 1 }
                }
            })
        };
        JsonSchemaValidator::new(schema::SchemaStore::new("schemas"))
            .with_schema("LoginRequest", record("LoginRequest"))
            .with_schema("MovieTicketResponse", record("MovieTicketResponse"))
            .with_schema(
                "SeatRequest",
                json!({
                    "type": "object",
                    "required": ["topicName", "showingId", "seats"],
                    "properties": {
                        "showingId": { "type": "string" },
                        "seats": { "type": "array", "minItems": 1 }
                    }
                }),
            )
    }

    fn gateway(login_url: &str, seat_url: &str, timeout_ms: u64, bus: &ChannelBus) -> GatewayRouter {
        let mut builder = TransportRegistry::builder();
        builder
            .register("LoginRequest", TransportKind::SyncCall, login_url)
            .register("SeatRequest", TransportKind::SyncCall, seat_url)
            .register(
                "MovieTicketResponse",
                TransportKind::AsyncPublish,
                "MovieTicketResponse",
            )
            // Routed on purpose without a schema
            .register("PaymentResponse", TransportKind::AsyncPublish, "PaymentResponse");

        let http = HttpCallExecutor::new(&HttpConfig {
            request_timeout_ms: timeout_ms,
            connect_timeout_ms: timeout_ms,
        })
        .unwrap();

        DispatchRouter::new(
            builder.build().unwrap(),
            validator(),
            http,
            BusPublishExecutor::new(bus.clone()),
        )
    }

    fn login(correlation_id: &str) -> Bytes {
        Bytes::from(
            json!({
                "topicName": "LoginRequest",
                "correlationId": correlation_id,
                "username": "alice",
                "password": "s3cret"
            })
            .to_string(),
        )
    }

    async fn no_message(sub: &mut ChannelSubscription) -> bool {
        tokio::time::timeout(Duration::from_millis(100), sub.next())
            .await
            .is_err()
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_sync_call_forwards_raw_payload() {
        let (login_url, login_rx) = downstream(StatusCode::OK).await;
        let (seat_url, _) = downstream(StatusCode::OK).await;
        let bus = ChannelBus::new(16);
        let router = gateway(&login_url, &seat_url, 2000, &bus);

        let payload = login("c-1");
        let outcome = router.handle(Envelope::decode(payload.clone()).unwrap()).await;

        assert_eq!(outcome, Outcome::Delivered(Delivery::Status(200)));
        let received = login_rx.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], payload);
    }

    #[tokio::test]
    async fn test_async_publish_emits_exactly_once() {
        let bus = ChannelBus::new(16);
        let mut sub = bus.subscribe(["MovieTicketResponse"]);
        let router = gateway("http://127.0.0.1:9/unused", "http://127.0.0.1:9/unused", 500, &bus);

        let payload = Bytes::from(
            json!({ "topicName": "MovieTicketResponse", "correlationId": "c-2", "status": "CONFIRMED" })
                .to_string(),
        );
        let outcome = router.handle(Envelope::decode(payload.clone()).unwrap()).await;

        assert_eq!(outcome, Outcome::Delivered(Delivery::Ack));
        let message = sub.next().await.unwrap();
        assert_eq!(message.topic, "MovieTicketResponse");
        assert_eq!(message.value, payload);
        assert!(no_message(&mut sub).await);
    }

    #[tokio::test]
    async fn test_unknown_topic_makes_no_calls() {
        let (login_url, login_rx) = downstream(StatusCode::OK).await;
        let (seat_url, seat_rx) = downstream(StatusCode::OK).await;
        let bus = ChannelBus::new(16);
        let mut sub = bus.subscribe(["MovieTicketResponse", "PaymentResponse", "BogusTopic"]);
        let router = gateway(&login_url, &seat_url, 2000, &bus);

        let outcome = router
            .handle(Envelope::new("BogusTopic", r#"{"topicName":"BogusTopic"}"#))
            .await;

        assert_eq!(outcome, Outcome::Unsupported("BogusTopic".into()));
        assert!(login_rx.lock().unwrap().is_empty());
        assert!(seat_rx.lock().unwrap().is_empty());
        assert!(no_message(&mut sub).await);
    }

    #[tokio::test]
    async fn test_missing_required_field_rejected() {
        let (login_url, _) = downstream(StatusCode::OK).await;
        let (seat_url, seat_rx) = downstream(StatusCode::OK).await;
        let bus = ChannelBus::new(16);
        let router = gateway(&login_url, &seat_url, 2000, &bus);

        let outcome = router
            .handle(Envelope::new(
                "SeatRequest",
                r#"{"topicName":"SeatRequest","showingId":"s-1"}"#,
            ))
            .await;

        let Outcome::Rejected(ValidationError::Invalid { violations, .. }) = outcome else {
            panic!("expected schema rejection, got {outcome:?}");
        };
        assert!(violations.iter().any(|v| v.contains("seats")), "{violations:?}");
        assert!(seat_rx.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_routed_topic_without_schema_rejected() {
        let bus = ChannelBus::new(16);
        let mut sub = bus.subscribe(["PaymentResponse"]);
        let router = gateway("http://127.0.0.1:9/unused", "http://127.0.0.1:9/unused", 500, &bus);

        let outcome = router
            .handle(Envelope::new("PaymentResponse", r#"{"topicName":"PaymentResponse"}"#))
            .await;

        assert!(
            matches!(outcome, Outcome::Rejected(ValidationError::SchemaNotFound { .. })),
            "got {outcome:?}"
        );
        assert!(no_message(&mut sub).await);
    }

    #[tokio::test]
    async fn test_unreachable_destination_fails_within_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = format!("http://{}/api/v1/processTopic", listener.local_addr().unwrap());
        drop(listener);

        let bus = ChannelBus::new(16);
        let router = gateway(&dead, &dead, 300, &bus);

        let started = Instant::now();
        let outcome = router.handle(Envelope::decode(login("c-5")).unwrap()).await;

        assert!(
            matches!(outcome, Outcome::Failed(TransportError::Unreachable { .. })),
            "got {outcome:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_slow_destination_fails_with_timeout() {
        let slow = Router::new().route(
            "/api/v1/processTopic",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                StatusCode::OK
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/v1/processTopic", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, slow).await.unwrap();
        });

        let bus = ChannelBus::new(16);
        let router = gateway(&url, &url, 200, &bus);

        let started = Instant::now();
        let outcome = router.handle(Envelope::decode(login("c-6")).unwrap()).await;

        assert!(
            matches!(outcome, Outcome::Failed(TransportError::Timeout { timeout_ms: 200, .. })),
            "got {outcome:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(router.metrics().snapshot().failed, 1);
    }

    #[tokio::test]
    async fn test_downstream_error_status_fails() {
        let (login_url, login_rx) = downstream(StatusCode::SERVICE_UNAVAILABLE).await;
        let bus = ChannelBus::new(16);
        let router = gateway(&login_url, &login_url, 2000, &bus);

        let outcome = router.handle(Envelope::decode(login("c-7")).unwrap()).await;

        assert!(
            matches!(outcome, Outcome::Failed(TransportError::Status { status: 503, .. })),
            "got {outcome:?}"
        );
        assert_eq!(login_rx.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_identical_envelopes_delivered_independently() {
        let (login_url, login_rx) = downstream(StatusCode::OK).await;
        let bus = ChannelBus::new(16);
        let router = gateway(&login_url, &login_url, 2000, &bus);

        let envelope = Envelope::decode(login("c-8")).unwrap();
        let first = router.handle(envelope.clone()).await;
        let second = router.handle(envelope).await;

        assert!(first.is_delivered());
        assert!(second.is_delivered());
        assert_eq!(login_rx.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rest_ingress_end_to_end() {
        let (login_url, login_rx) = downstream(StatusCode::OK).await;
        let bus = ChannelBus::new(16);
        let router = Arc::new(gateway(&login_url, &login_url, 2000, &bus));
        let app = rest_router(router, "This microservice is the [API-GATEWAY]!", Arc::new(IngressMetrics::new()));

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/v1/processTopic")
                    .header("content-type", "application/json")
                    .body(Body::from(login("c-9")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(login_rx.lock().unwrap().len(), 1);

        let response = app
            .oneshot(
                Request::post("/api/v1/processTopic")
                    .body(Body::from(r#"{"topicName":"BogusTopic"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["detail"], "non-supported topic: BogusTopic");
    }

    #[tokio::test]
    async fn test_bus_ingress_end_to_end() {
        let (login_url, login_rx) = downstream(StatusCode::OK).await;
        let bus = ChannelBus::new(16);
        let router = Arc::new(gateway(&login_url, &login_url, 2000, &bus));

        let ingress = BusIngress::new(
            Arc::clone(&router),
            bus.subscribe(["LoginRequest"]),
            FailurePolicy::Drop,
        );
        let metrics = ingress.metrics();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = ingress.spawn(async move {
            let _ = stop_rx.await;
        });

        bus.publish(BusMessage::new("LoginRequest", login("c-10")))
            .await
            .unwrap();

        wait_for(|| login_rx.lock().unwrap().len() == 1).await;
        stop_tx.send(()).unwrap();
        task.await.unwrap();

        assert_eq!(metrics.snapshot().received, 1);
        assert_eq!(router.metrics().snapshot().delivered, 1);
    }
}
