//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active chat connections
//! - Inbound chat frames by outcome
//! - Failed broadcast deliveries

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace("packet"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("packet")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Open chat WebSocket connections across all groups
pub static CHAT_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "chat_connections_active",
            "Number of registered chat connections",
        )
        .namespace("packet"),
    )
    .expect("Failed to create CHAT_CONNECTIONS_ACTIVE metric")
});

/// Inbound chat frames by outcome ("saved", "rejected", "malformed")
pub static CHAT_FRAMES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("chat_frames_total", "Inbound chat frames by outcome").namespace("packet"),
        &["outcome"],
    )
    .expect("Failed to create CHAT_FRAMES_TOTAL metric")
});

/// Broadcast sends that failed and evicted the target connection
pub static CHAT_BROADCAST_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "chat_broadcast_failures_total",
            "Broadcast deliveries that failed",
        )
        .namespace("packet"),
    )
    .expect("Failed to create CHAT_BROADCAST_FAILURES_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(CHAT_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register CHAT_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(CHAT_FRAMES_TOTAL.clone()))
        .expect("Failed to register CHAT_FRAMES_TOTAL");
    registry
        .register(Box::new(CHAT_BROADCAST_FAILURES_TOTAL.clone()))
        .expect("Failed to register CHAT_BROADCAST_FAILURES_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Outcome of one inbound chat frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Saved,
    Rejected,
    Malformed,
}

impl FrameOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            FrameOutcome::Saved => "saved",
            FrameOutcome::Rejected => "rejected",
            FrameOutcome::Malformed => "malformed",
        }
    }
}

/// Helper to count an inbound chat frame
pub fn record_chat_frame(outcome: FrameOutcome) {
    CHAT_FRAMES_TOTAL.with_label_values(&[outcome.as_str()]).inc();
}

/// Helper to track chat connection registration
pub fn chat_connection_opened() {
    CHAT_CONNECTIONS_ACTIVE.inc();
}

/// Helper to track chat connection removal
pub fn chat_connection_closed() {
    CHAT_CONNECTIONS_ACTIVE.dec();
}

/// Helper to count a failed broadcast delivery
pub fn record_broadcast_failure() {
    CHAT_BROADCAST_FAILURES_TOTAL.inc();
}
