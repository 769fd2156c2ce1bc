//! Gateway orchestrator - wires the router and its adapters.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bus::ChannelBus;
use contracts::{BusBackend, BusConsumer, BusPublisher, GatewayBlueprint};
use dispatcher::{BusPublishExecutor, DispatchRouter, HttpCallExecutor, TransportRegistry};
use ingestion::{rest_router, BusIngress, FailurePolicy, IngestionError, IngressMetrics};
use schema::JsonSchemaValidator;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::GatewayStats;
use crate::error::{CliError, Result};

type Router<B> = DispatchRouter<JsonSchemaValidator, HttpCallExecutor, BusPublishExecutor<B>>;

/// Main gateway orchestrator
pub struct Gateway {
    blueprint: GatewayBlueprint,
}

/// Bus-independent parts of the router
struct Wiring {
    registry: TransportRegistry,
    validator: JsonSchemaValidator,
    call_executor: HttpCallExecutor,
}

impl Wiring {
    fn router<B>(self, bus: B) -> Router<B> {
        DispatchRouter::new(
            self.registry,
            self.validator,
            self.call_executor,
            BusPublishExecutor::new(bus),
        )
    }
}

impl Gateway {
    /// Create a gateway from a validated blueprint
    pub fn new(blueprint: GatewayBlueprint) -> Self {
        Self { blueprint }
    }

    /// Run until `shutdown` resolves or the REST server stops
    #[instrument(
        name = "gateway_run",
        skip_all,
        fields(service = %self.blueprint.service.name, bus = self.blueprint.bus.backend.as_str())
    )]
    pub async fn run<F>(self, shutdown: F) -> Result<GatewayStats>
    where
        F: Future<Output = ()> + Send,
    {
        let started = Instant::now();
        let blueprint = self.blueprint;

        let validator = JsonSchemaValidator::from_dir(&blueprint.schema.dir)?;
        info!(
            dir = %blueprint.schema.dir.display(),
            schemas = validator.store().len(),
            "Schemas loaded"
        );

        let registry = TransportRegistry::from_routes(&blueprint.routes)?;
        for entry in registry.routes() {
            if validator.store().get(&entry.topic).is_none() {
                warn!(topic = %entry.topic, "Routed topic has no schema, it will be rejected");
            }
        }

        let wiring = Wiring {
            registry,
            validator,
            call_executor: HttpCallExecutor::new(&blueprint.http)?,
        };
        let consumed: Vec<String> = blueprint
            .consumed_topics()
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(topics = ?consumed, "Consuming bus topics");

        match blueprint.bus.backend {
            BusBackend::Channel => {
                warn!(
                    "In-process channel bus: bus ingress only sees messages published by this \
                     gateway, and published topics reach no other service"
                );
                let bus = ChannelBus::new(blueprint.bus.capacity);
                let subscription = bus.subscribe(consumed);
                serve(&blueprint, wiring.router(bus), subscription, shutdown, started)
                    .await
            }
            #[cfg(feature = "kafka")]
            BusBackend::Kafka => {
                let bus = bus::KafkaBus::new(&blueprint.bus.kafka).map_err(CliError::Bus)?;
                let subscription = bus.subscribe(consumed).map_err(CliError::Bus)?;
                serve(&blueprint, wiring.router(bus), subscription, shutdown, started)
                    .await
            }
            #[cfg(not(feature = "kafka"))]
            BusBackend::Kafka => Err(CliError::backend_unavailable(BusBackend::Kafka, "kafka")),
        }
    }
}

/// Serve REST and bus ingress until shutdown
async fn serve<B, C, F>(
    blueprint: &GatewayBlueprint,
    router: Router<B>,
    consumer: C,
    shutdown: F,
    started: Instant,
) -> Result<GatewayStats>
where
    B: BusPublisher + Send + Sync + 'static,
    C: BusConsumer + Send + Sync + 'static,
    F: Future<Output = ()> + Send,
{
    let router = Arc::new(router);
    let routes = router.registry().len();
    let dispatch_metrics = router.metrics();

    let (stop_tx, stop_rx) = watch::channel(false);

    // Bus ingress
    let ingress = BusIngress::new(
        Arc::clone(&router),
        consumer,
        FailurePolicy::from_config(&blueprint.bus),
    )
    .with_drain_timeout(blueprint.http.request_timeout());
    let bus_metrics = ingress.metrics();
    let ingress_task = ingress.spawn(stopped(stop_rx.clone()));

    // REST ingress
    let rest_metrics = Arc::new(IngressMetrics::new());
    let app = rest_router(
        Arc::clone(&router),
        blueprint.service.identity.as_str(),
        Arc::clone(&rest_metrics),
    );
    let listener = TcpListener::bind(&blueprint.service.listen_addr)
        .await
        .map_err(|source| IngestionError::Bind {
            addr: blueprint.service.listen_addr.clone(),
            source,
        })?;
    let mut rest_task = tokio::spawn(ingestion::serve(listener, app, stopped(stop_rx)));

    info!(
        listen = %blueprint.service.listen_addr,
        routes,
        "Gateway ready"
    );

    let rest_result = tokio::select! {
        _ = shutdown => {
            info!("Shutdown requested, draining ingress");
            let _ = stop_tx.send(true);
            (&mut rest_task).await
        }
        result = &mut rest_task => {
            warn!("REST server stopped unexpectedly");
            let _ = stop_tx.send(true);
            result
        }
    };

    rest_result.map_err(|e| CliError::task("rest", e.to_string()))??;
    ingress_task
        .await
        .map_err(|e| CliError::task("bus_ingress", e.to_string()))?;

    let stats = GatewayStats {
        dispatch: dispatch_metrics.snapshot(),
        rest: rest_metrics.snapshot(),
        bus: bus_metrics.snapshot(),
        routes,
        duration: started.elapsed(),
    };
    info!(
        handled = stats.dispatch.total(),
        delivered = stats.dispatch.delivered,
        duration_secs = stats.duration.as_secs_f64(),
        "Gateway stopped"
    );
    Ok(stats)
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RouteConfig, TransportKind};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("SeatResponse.json"),
            r#"{"type":"object","required":["topicName"]}"#,
        )
        .unwrap();

        let mut blueprint = GatewayBlueprint::default();
        blueprint.service.listen_addr = "127.0.0.1:0".to_string();
        blueprint.schema.dir = dir.path().to_path_buf();
        blueprint.routes = vec![RouteConfig {
            topic: "SeatResponse".into(),
            transport: TransportKind::AsyncPublish,
            destination: "SeatResponse".into(),
        }];

        let stats = Gateway::new(blueprint)
            .run(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(stats.routes, 1);
        assert_eq!(stats.dispatch.total(), 0);
    }

    #[cfg(not(feature = "kafka"))]
    #[tokio::test]
    async fn test_kafka_backend_requires_feature() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = GatewayBlueprint::default();
        blueprint.service.listen_addr = "127.0.0.1:0".to_string();
        blueprint.schema.dir = dir.path().to_path_buf();
        blueprint.bus.backend = BusBackend::Kafka;
        blueprint.routes = vec![RouteConfig {
            topic: "SeatResponse".into(),
            transport: TransportKind::AsyncPublish,
            destination: "SeatResponse".into(),
        }];

        let err = Gateway::new(blueprint)
            .run(std::future::pending())
            .await
            .unwrap_err();
        assert!(
            matches!(err, CliError::BackendUnavailable { backend: "kafka", .. }),
            "got {err}"
        );
    }

    #[tokio::test]
    async fn test_missing_schema_dir_fails() {
        let mut blueprint = GatewayBlueprint::default();
        blueprint.schema.dir = "/definitely/not/here".into();
        blueprint.routes = vec![RouteConfig {
            topic: "SeatResponse".into(),
            transport: TransportKind::AsyncPublish,
            destination: "SeatResponse".into(),
        }];

        let err = Gateway::new(blueprint)
            .run(std::future::ready(()))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Schema(_)), "got {err}");
    }
}
