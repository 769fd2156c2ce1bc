//! Failure policy and ingress metrics

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{BusConfig, FailurePolicyKind};

/// What the bus adapter does with an envelope whose delivery failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log and drop
    #[default]
    Drop,
    /// Nack for redelivery until `max_attempts` deliveries were made
    Redeliver { max_attempts: u32 },
}

impl FailurePolicy {
    pub fn from_config(config: &BusConfig) -> Self {
        match config.failure_policy {
            FailurePolicyKind::Drop => Self::Drop,
            FailurePolicyKind::Redeliver => Self::Redeliver {
                max_attempts: config.max_attempts,
            },
        }
    }

    /// Whether a message that failed on `attempt` (0-based) is redelivered
    pub fn should_redeliver(&self, attempt: u32) -> bool {
        match self {
            Self::Drop => false,
            Self::Redeliver { max_attempts } => attempt.saturating_add(1) < *max_attempts,
        }
    }
}

/// Ingress metrics
#[derive(Debug, Default)]
pub struct IngressMetrics {
    /// Messages received from the adapter
    received: AtomicU64,
    /// Messages that did not decode into an envelope
    decode_failures: AtomicU64,
    /// Messages dropped after handling
    dropped: AtomicU64,
    /// Messages handed back for redelivery
    redelivered: AtomicU64,
}

impl IngressMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_redelivered(&self) {
        self.redelivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> IngressSnapshot {
        IngressSnapshot {
            received: self.received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            redelivered: self.redelivered.load(Ordering::Relaxed),
        }
    }
}

/// Ingress metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressSnapshot {
    pub received: u64,
    pub decode_failures: u64,
    pub dropped: u64,
    pub redelivered: u64,
}
