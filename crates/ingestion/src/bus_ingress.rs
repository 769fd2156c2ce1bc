//! Bus ingress adapter
//!
//! Consumes bus topics and hands each message to the dispatch router on its
//! own task. Redelivery requests travel back to the consumption loop, which
//! is the only place allowed to touch the consumer. On shutdown the loop
//! waits, up to the drain timeout, for in-flight messages to finish.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use contracts::{BusConsumer, BusMessage, Envelope, Outcome, TopicHandler};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{FailurePolicy, IngressMetrics};

const ADAPTER: &str = "bus";

/// Default bound on waiting for in-flight messages at shutdown
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Bus consumer feeding a `TopicHandler`
pub struct BusIngress<H, C> {
    handler: Arc<H>,
    consumer: C,
    policy: FailurePolicy,
    metrics: Arc<IngressMetrics>,
    drain_timeout: Duration,
}

impl<H, C> BusIngress<H, C>
where
    H: TopicHandler + Send + Sync + 'static,
    C: BusConsumer + Send + Sync + 'static,
{
    pub fn new(handler: Arc<H>, consumer: C, policy: FailurePolicy) -> Self {
        Self {
            handler,
            consumer,
            policy,
            metrics: Arc::new(IngressMetrics::new()),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Bound the wait for in-flight messages once consumption stops
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Share an externally owned metrics instance
    pub fn with_metrics(mut self, metrics: Arc<IngressMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<IngressMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Consume until the bus closes or `shutdown` resolves
    #[instrument(name = "bus_ingress_run", skip_all, fields(policy = ?self.policy))]
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        info!("Bus ingress started");
        let (redeliver_tx, mut redeliver_rx) = mpsc::unbounded_channel::<BusMessage>();
        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Bus ingress shutdown requested");
                    break;
                }
                Some(message) = redeliver_rx.recv() => {
                    self.redeliver(message).await;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        error!(error = %err, "Bus message task failed");
                    }
                }
                next = self.consumer.next() => {
                    let Some(message) = next else {
                        info!("Bus closed, stopping ingress");
                        break;
                    };
                    self.metrics.record_received();
                    observability::record_ingress(ADAPTER);
                    in_flight.spawn(process(
                        Arc::clone(&self.handler),
                        message,
                        self.policy,
                        Arc::clone(&self.metrics),
                        redeliver_tx.clone(),
                    ));
                }
            }
        }

        self.drain(&mut in_flight, &mut redeliver_rx).await;

        let snap = self.metrics.snapshot();
        info!(
            received = snap.received,
            decode_failures = snap.decode_failures,
            dropped = snap.dropped,
            redelivered = snap.redelivered,
            "Bus ingress stopped"
        );
    }

    /// Spawn the ingress as a background task
    pub fn spawn<F>(self, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(self.run(shutdown))
    }

    /// Wait for in-flight messages, then flush their redelivery requests
    async fn drain(
        &self,
        in_flight: &mut JoinSet<()>,
        redeliver_rx: &mut mpsc::UnboundedReceiver<BusMessage>,
    ) {
        if !in_flight.is_empty() {
            info!(in_flight = in_flight.len(), "Draining in-flight bus messages");
            let finished = tokio::time::timeout(self.drain_timeout, async {
                while in_flight.join_next().await.is_some() {}
            })
            .await;
            if finished.is_err() {
                warn!(
                    aborted = in_flight.len(),
                    timeout_ms = self.drain_timeout.as_millis() as u64,
                    "Drain timed out, aborting in-flight bus messages"
                );
                in_flight.abort_all();
            }
        }

        redeliver_rx.close();
        while let Ok(message) = redeliver_rx.try_recv() {
            self.redeliver(message).await;
        }
    }

    async fn redeliver(&self, message: BusMessage) {
        let topic = message.topic.clone();
        match self.consumer.nack(message).await {
            Ok(()) => {
                self.metrics.record_redelivered();
                observability::record_redelivery(&topic);
            }
            Err(err) => {
                self.metrics.record_dropped();
                error!(bus_topic = %topic, error = %err, "Redelivery failed, message dropped");
            }
        }
    }
}

#[instrument(
    name = "bus_ingress_process",
    skip_all,
    fields(bus_topic = %message.topic, attempt = message.attempt)
)]
async fn process<H>(
    handler: Arc<H>,
    message: BusMessage,
    policy: FailurePolicy,
    metrics: Arc<IngressMetrics>,
    redeliver_tx: mpsc::UnboundedSender<BusMessage>,
) where
    H: TopicHandler + Send + Sync + 'static,
{
    let envelope = match Envelope::decode(message.value.clone()) {
        Ok(envelope) => envelope,
        Err(err) => {
            metrics.record_decode_failure();
            observability::record_ingress_decode_failure(ADAPTER);
            warn!(error = %err, "Dropping undecodable bus message");
            return;
        }
    };

    match handler.handle(envelope).await {
        Outcome::Delivered(_) => {
            debug!("Bus message dispatched");
        }
        Outcome::Failed(err) if policy.should_redeliver(message.attempt) => {
            warn!(error = %err, "Delivery failed, requesting redelivery");
            if redeliver_tx.send(message).is_err() {
                metrics.record_dropped();
                warn!("Ingress stopped before redelivery, message dropped");
            }
        }
        Outcome::Failed(err) => {
            metrics.record_dropped();
            error!(error = %err, "Delivery failed, message dropped");
        }
        outcome => {
            metrics.record_dropped();
            warn!(outcome = outcome.kind(), detail = %outcome.detail(), "Bus message dropped");
        }
    }
}
