// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

use crate::errors::Scope;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order aggregation outcomes and latency
// - Failures by scope (which sub-fetch failed)
// - Remote requests by resource, and line item pages walked
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Aggregation Metrics
    pub order_aggregations_total: IntCounterVec,
    pub order_fetch_failures_total: IntCounterVec,
    pub order_aggregation_duration: Histogram,

    // Remote API Metrics
    pub remote_requests_total: IntCounterVec,
    pub line_item_pages_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_aggregations_total = IntCounterVec::new(
            Opts::new("order_aggregations_total", "Total order aggregation attempts"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_aggregations_total.clone()))?;

        let order_fetch_failures_total = IntCounterVec::new(
            Opts::new("order_fetch_failures_total", "Failed aggregations by failing operation"),
            &["scope"],
        )?;
        registry.register(Box::new(order_fetch_failures_total.clone()))?;

        let order_aggregation_duration = Histogram::with_opts(
            HistogramOpts::new("order_aggregation_duration_seconds", "Order aggregation duration")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(order_aggregation_duration.clone()))?;

        let remote_requests_total = IntCounterVec::new(
            Opts::new("remote_requests_total", "Requests issued to the store API"),
            &["resource"],
        )?;
        registry.register(Box::new(remote_requests_total.clone()))?;

        let line_item_pages_total = IntCounter::new(
            "line_item_pages_total",
            "Line item pages requested",
        )?;
        registry.register(Box::new(line_item_pages_total.clone()))?;

        Ok(Self {
            registry,
            order_aggregations_total,
            order_fetch_failures_total,
            order_aggregation_duration,
            remote_requests_total,
            line_item_pages_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one finished aggregation
    pub fn record_aggregation(&self, duration_secs: f64, failed_scope: Option<Scope>) {
        match failed_scope {
            None => {
                self.order_aggregations_total.with_label_values(&["success"]).inc();
            }
            Some(scope) => {
                self.order_aggregations_total.with_label_values(&["error"]).inc();
                self.order_fetch_failures_total.with_label_values(&[scope.as_str()]).inc();
            }
        }
        self.order_aggregation_duration.observe(duration_secs);
    }
}
