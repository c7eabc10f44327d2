//! Built-in endpoints answered before the resize route.
//!
//! `/health` reports liveness as JSON and `/metrics` exports the request
//! counters in Prometheus text format. Both are exact path matches, so an
//! origin path can never collide with them (resize paths always start with
//! an operation segment).

use bytes::Bytes;
use http::HeaderValue;
use std::time::Instant;

use crate::metrics::Metrics;
use crate::proxy::response::ResizeResponse;

pub const HEALTH_PATH: &str = "/health";
pub const METRICS_PATH: &str = "/metrics";

/// Body and media type produced by a built-in endpoint
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl EndpointResponse {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    /// Prometheus text exposition format 0.0.4
    pub fn prometheus(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/plain; version=0.0.4",
            body,
        }
    }
}

impl From<EndpointResponse> for ResizeResponse {
    fn from(endpoint: EndpointResponse) -> Self {
        let body = Bytes::from(endpoint.body);
        Self {
            status: endpoint.status,
            reason: "OK",
            headers: vec![
                ("Content-Type", HeaderValue::from_static(endpoint.content_type)),
                ("Content-Length", HeaderValue::from(body.len())),
            ],
            body,
        }
    }
}

/// Dispatch a built-in endpoint, if `path` names one
pub fn handle_special(
    path: &str,
    start_time: Instant,
    metrics: &Metrics,
) -> Option<EndpointResponse> {
    match path {
        HEALTH_PATH => Some(handle_health(start_time)),
        METRICS_PATH => Some(handle_metrics(metrics)),
        _ => None,
    }
}

/// Liveness report: always healthy while the process can answer
pub fn handle_health(start_time: Instant) -> EndpointResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    });

    EndpointResponse::json(200, body.to_string())
}

pub fn handle_metrics(metrics: &Metrics) -> EndpointResponse {
    EndpointResponse::prometheus(metrics.export_prometheus())
}
