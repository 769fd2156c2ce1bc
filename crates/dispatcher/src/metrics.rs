//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::Outcome;

/// Per-router outcome counters
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    delivered: AtomicU64,
    rejected: AtomicU64,
    unsupported: AtomicU64,
    failed: AtomicU64,
    /// Accumulated delivery latency of delivered envelopes
    latency_ms_total: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome
    pub fn record(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Delivered(_) => &self.delivered,
            Outcome::Rejected(_) => &self.rejected,
            Outcome::Unsupported(_) => &self.unsupported,
            Outcome::Failed(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Add delivery latency
    pub fn add_latency_ms(&self, ms: u64) {
        self.latency_ms_total.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn unsupported(&self) -> u64 {
        self.unsupported.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            delivered: self.delivered(),
            rejected: self.rejected(),
            unsupported: self.unsupported(),
            failed: self.failed(),
            latency_ms_total: self.latency_ms_total.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub delivered: u64,
    pub rejected: u64,
    pub unsupported: u64,
    pub failed: u64,
    pub latency_ms_total: u64,
}

impl DispatchSnapshot {
    /// Envelopes handled, whatever the outcome
    pub fn total(&self) -> u64 {
        self.delivered + self.rejected + self.unsupported + self.failed
    }

    /// Mean latency of delivered envelopes
    pub fn avg_latency_ms(&self) -> f64 {
        if self.delivered == 0 {
            return 0.0;
        }
        self.latency_ms_total as f64 / self.delivered as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Delivery, TransportError};

    #[test]
    fn test_record_counts_by_kind() {
        let metrics = DispatchMetrics::new();
        metrics.record(&Outcome::Delivered(Delivery::Ack));
        metrics.record(&Outcome::Delivered(Delivery::Status(200)));
        metrics.record(&Outcome::Unsupported("Nope".into()));
        metrics.record(&Outcome::Failed(TransportError::Status {
            destination: "http://x".into(),
            status: 500,
        }));
        metrics.add_latency_ms(10);
        metrics.add_latency_ms(30);

        let snap = metrics.snapshot();
        assert_eq!(snap.delivered, 2);
        assert_eq!(snap.rejected, 0);
        assert_eq!(snap.unsupported, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.total(), 4);
        assert_eq!(snap.avg_latency_ms(), 20.0);
    }

    #[test]
    fn test_avg_latency_without_deliveries() {
        assert_eq!(DispatchSnapshot::default().avg_latency_ms(), 0.0);
    }
}
