// Metrics module - Prometheus-compatible metrics tracking
// Counters and gauges for the resize pipeline, exported as text at /metrics

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::resize::Operation;

/// Metrics struct tracks counters for Prometheus export
/// Thread-safe via atomic operations and mutexes
#[derive(Default)]
pub struct Metrics {
    // Request counters
    request_count: AtomicU64,

    // Status code counters (e.g., 200, 403, 404)
    status_counts: Mutex<BTreeMap<u16, u64>>,

    // Operation counters (fit, scale, tn)
    operation_counts: Mutex<BTreeMap<&'static str, u64>>,

    // Error counters by kind (origin_not_allowed, invalid_image, ...)
    error_counts: Mutex<BTreeMap<&'static str, u64>>,

    // Requests currently in flight
    active_requests: AtomicU64,

    // Response bytes of transformed images
    bytes_sent: AtomicU64,

    // Origin bytes fetched
    bytes_fetched: AtomicU64,

    // Total handling time in microseconds
    duration_sum_micros: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn increment_status_count(&self, status: u16) {
        *self.status_counts.lock().entry(status).or_insert(0) += 1;
    }

    pub fn status_count(&self, status: u16) -> u64 {
        self.status_counts.lock().get(&status).copied().unwrap_or(0)
    }

    pub fn increment_operation(&self, op: Operation) {
        *self.operation_counts.lock().entry(op.as_str()).or_insert(0) += 1;
    }

    pub fn operation_count(&self, op: Operation) -> u64 {
        self.operation_counts
            .lock()
            .get(op.as_str())
            .copied()
            .unwrap_or(0)
    }

    pub fn increment_error(&self, kind: &'static str) {
        *self.error_counts.lock().entry(kind).or_insert(0) += 1;
    }

    pub fn error_count(&self, kind: &str) -> u64 {
        self.error_counts.lock().get(kind).copied().unwrap_or(0)
    }

    pub fn increment_active_requests(&self) {
        self.active_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_active_requests(&self) {
        // Saturating: never wrap below zero
        let _ = self
            .active_requests
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    pub fn active_requests(&self) -> u64 {
        self.active_requests.load(Ordering::Relaxed)
    }

    pub fn add_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_bytes_fetched(&self, bytes: u64) {
        self.bytes_fetched.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_duration(&self, duration: Duration) {
        self.duration_sum_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP shukusho_requests_total Total number of requests handled\n");
        output.push_str("# TYPE shukusho_requests_total counter\n");
        output.push_str(&format!(
            "shukusho_requests_total {}\n",
            self.request_count()
        ));

        output.push_str("\n# HELP shukusho_responses_total Responses by HTTP status code\n");
        output.push_str("# TYPE shukusho_responses_total counter\n");
        for (status, count) in self.status_counts.lock().iter() {
            output.push_str(&format!(
                "shukusho_responses_total{{status=\"{}\"}} {}\n",
                status, count
            ));
        }

        output.push_str("\n# HELP shukusho_operations_total Validated requests by operation\n");
        output.push_str("# TYPE shukusho_operations_total counter\n");
        for (op, count) in self.operation_counts.lock().iter() {
            output.push_str(&format!(
                "shukusho_operations_total{{op=\"{}\"}} {}\n",
                op, count
            ));
        }

        output.push_str("\n# HELP shukusho_errors_total Failed requests by error kind\n");
        output.push_str("# TYPE shukusho_errors_total counter\n");
        for (kind, count) in self.error_counts.lock().iter() {
            output.push_str(&format!(
                "shukusho_errors_total{{kind=\"{}\"}} {}\n",
                kind, count
            ));
        }

        output.push_str("\n# HELP shukusho_active_requests Requests currently in flight\n");
        output.push_str("# TYPE shukusho_active_requests gauge\n");
        output.push_str(&format!(
            "shukusho_active_requests {}\n",
            self.active_requests()
        ));

        output.push_str("\n# HELP shukusho_bytes_sent_total Transformed image bytes sent\n");
        output.push_str("# TYPE shukusho_bytes_sent_total counter\n");
        output.push_str(&format!(
            "shukusho_bytes_sent_total {}\n",
            self.bytes_sent.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP shukusho_bytes_fetched_total Origin image bytes fetched\n");
        output.push_str("# TYPE shukusho_bytes_fetched_total counter\n");
        output.push_str(&format!(
            "shukusho_bytes_fetched_total {}\n",
            self.bytes_fetched.load(Ordering::Relaxed)
        ));

        output.push_str(
            "\n# HELP shukusho_request_duration_seconds_sum Total request handling time\n",
        );
        output.push_str("# TYPE shukusho_request_duration_seconds_sum counter\n");
        output.push_str(&format!(
            "shukusho_request_duration_seconds_sum {:.6}\n",
            self.duration_sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
        ));

        output
    }
}
