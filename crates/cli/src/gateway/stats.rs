//! Gateway run statistics.

use std::time::Duration;

use dispatcher::DispatchSnapshot;
use ingestion::IngressSnapshot;

/// Statistics from a gateway run
#[derive(Debug, Clone, Default)]
pub struct GatewayStats {
    /// Router outcome counters
    pub dispatch: DispatchSnapshot,

    /// REST ingress counters
    pub rest: IngressSnapshot,

    /// Bus ingress counters
    pub bus: IngressSnapshot,

    /// Number of routes in the registry
    pub routes: usize,

    /// Total duration of the run
    pub duration: Duration,
}

impl GatewayStats {
    /// Handled envelopes per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.total() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of handled envelopes that were delivered, in percent
    pub fn delivery_rate(&self) -> f64 {
        let total = self.dispatch.total();
        if total > 0 {
            (self.dispatch.delivered as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Dispatch Summary ===\n");

        println!("Overview");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Routes: {}", self.routes);
        println!("   Envelopes handled: {}", self.dispatch.total());
        println!("   Throughput: {:.2}/s", self.throughput());

        println!("\nOutcomes");
        println!(
            "   Delivered: {} ({:.2}%)",
            self.dispatch.delivered,
            self.delivery_rate()
        );
        println!("   Rejected: {}", self.dispatch.rejected);
        println!("   Unsupported: {}", self.dispatch.unsupported);
        println!("   Failed: {}", self.dispatch.failed);
        println!(
            "   Avg delivery latency: {:.2}ms",
            self.dispatch.avg_latency_ms()
        );

        println!("\nIngress");
        println!(
            "   REST: {} received, {} malformed",
            self.rest.received, self.rest.decode_failures
        );
        println!(
            "   Bus: {} received, {} malformed, {} dropped, {} redelivered",
            self.bus.received, self.bus.decode_failures, self.bus.dropped, self.bus.redelivered
        );

        println!();
    }
}
