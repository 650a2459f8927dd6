//! Metrics collection for observability

use prometheus::{
    CounterVec, HistogramVec, Opts, Registry,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};
use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;

use crate::upstream::Upstream;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Outbound call metrics
    pub upstream_requests: CounterVec,
    pub upstream_request_duration: HistogramVec,

    // Requests turned away before any outbound call
    pub handler_rejections: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let upstream_requests = register_counter_vec_with_registry!(
            Opts::new("upstream_requests_total", "Total outbound requests by outcome"),
            &["upstream", "outcome"],
            registry
        )?;

        let upstream_request_duration = register_histogram_vec_with_registry!(
            "upstream_request_duration_seconds",
            "Outbound request duration in seconds",
            &["upstream"],
            registry
        )?;

        let handler_rejections = register_counter_vec_with_registry!(
            Opts::new("handler_rejections_total", "Requests rejected as invalid input"),
            &["endpoint"],
            registry
        )?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            upstream_requests,
            upstream_request_duration,
            handler_rejections,
        })
    }

    /// Record the outcome and latency of one outbound call
    pub fn record_upstream(&self, upstream: Upstream, outcome: &str, elapsed: Duration) {
        self.upstream_requests
            .with_label_values(&[upstream.as_str(), outcome])
            .inc();
        self.upstream_request_duration
            .with_label_values(&[upstream.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a request rejected before reaching an upstream
    pub fn record_rejection(&self, endpoint: &str) {
        self.handler_rejections.with_label_values(&[endpoint]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
