//! Observability for the sizing engine
//!
//! Provides:
//! - Prometheus metrics (evaluation latency, request outcomes, catalog size)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::configurator::ValidationResult;
use crate::estimator::{EstimatorResult, WorkloadIntent};
use crate::leak::RevenueLeakResult;
use crate::recommender::RecommendationResponse;

/// Histogram buckets for evaluation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5,
];

static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

/// Engine operation a request maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Estimate,
    Validate,
    Recommend,
    Leak,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Estimate,
        Operation::Validate,
        Operation::Recommend,
        Operation::Leak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Estimate => "estimate",
            Operation::Validate => "validate",
            Operation::Recommend => "recommend",
            Operation::Leak => "leak",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct EngineMetricsInner {
    evaluation_latency_seconds: HistogramVec,
    requests_total: IntCounterVec,
    invalid_builds_total: IntCounter,
    rate_limited_total: IntCounterVec,
    catalog_skus: IntGauge,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            evaluation_latency_seconds: register_histogram_vec!(
                "sizing_evaluation_latency_seconds",
                "Time spent evaluating a sizing request",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register evaluation_latency_seconds"),

            requests_total: register_int_counter_vec!(
                "sizing_requests_total",
                "Requests handled by operation and outcome",
                &["operation", "outcome"]
            )
            .expect("Failed to register requests_total"),

            invalid_builds_total: register_int_counter!(
                "sizing_invalid_builds_total",
                "Builds rejected with at least one hard block"
            )
            .expect("Failed to register invalid_builds_total"),

            rate_limited_total: register_int_counter_vec!(
                "sizing_rate_limited_total",
                "Requests denied by the rate limiter",
                &["operation"]
            )
            .expect("Failed to register rate_limited_total"),

            catalog_skus: register_int_gauge!(
                "sizing_catalog_skus",
                "Number of server SKUs in the loaded catalog"
            )
            .expect("Failed to register catalog_skus"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance. Clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn observe_evaluation(&self, op: Operation, duration_secs: f64) {
        self.inner()
            .evaluation_latency_seconds
            .with_label_values(&[op.as_str()])
            .observe(duration_secs);
    }

    /// Count a handled request; `outcome` is "ok", "invalid" or "rejected"
    pub fn inc_request(&self, op: Operation, outcome: &str) {
        self.inner()
            .requests_total
            .with_label_values(&[op.as_str(), outcome])
            .inc();
    }

    pub fn inc_invalid_builds(&self) {
        self.inner().invalid_builds_total.inc();
    }

    pub fn inc_rate_limited(&self, op: Operation) {
        self.inner()
            .rate_limited_total
            .with_label_values(&[op.as_str()])
            .inc();
    }

    pub fn set_catalog_skus(&self, count: usize) {
        self.inner().catalog_skus.set(count as i64);
    }

    pub fn requests(&self, op: Operation, outcome: &str) -> u64 {
        self.inner()
            .requests_total
            .with_label_values(&[op.as_str(), outcome])
            .get()
    }
}

/// Structured logger for sizing events
///
/// Provides consistent JSON-formatted logging for evaluations, rejected
/// requests and service lifecycle.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_estimate(&self, intent: &WorkloadIntent, result: &EstimatorResult) {
        let spec = &result.recommended_spec;
        info!(
            event = "estimate_computed",
            service = %self.service,
            workload_type = intent.workload_type.as_str(),
            user_count = intent.user_count,
            cpu_cores = spec.cpu_cores,
            ram_gb = spec.ram_gb,
            storage_gb = spec.storage_gb,
            gpu_count = spec.gpu_count,
            headroom_factor = result.headroom_factor,
            "Computed hardware estimate"
        );
    }

    pub fn log_build_validation(&self, cpu_model: &str, result: &ValidationResult) {
        if result.is_valid {
            info!(
                event = "build_validated",
                service = %self.service,
                cpu_model = %cpu_model,
                is_valid = true,
                warnings = result.warnings.len(),
                total_cost_monthly = result.metrics.total_cost_monthly,
                power_draw_watts = result.metrics.power_draw_watts,
                "Build validated"
            );
        } else {
            warn!(
                event = "build_validated",
                service = %self.service,
                cpu_model = %cpu_model,
                is_valid = false,
                hard_blocks = result.hard_blocks.len(),
                power_draw_watts = result.metrics.power_draw_watts,
                "Build has hard blocks"
            );
        }
    }

    pub fn log_recommendation(&self, app_type: &str, result: &RecommendationResponse) {
        info!(
            event = "servers_recommended",
            service = %self.service,
            app_type = %app_type,
            matches = result.recommendations.len(),
            bottleneck = %result.explanation.bottleneck,
            min_cpu_cores = result.requirements.min_cpu_cores,
            min_ram_gb = result.requirements.min_ram_gb,
            "Recommended servers"
        );
    }

    pub fn log_leak(&self, result: &RevenueLeakResult) {
        info!(
            event = "leak_scored",
            service = %self.service,
            risk_score = result.risk_score,
            band = result.band.as_str(),
            monthly_leak = result.monthly_leak,
            "Scored revenue leak"
        );
    }

    pub fn log_rejected(&self, op: Operation, code: &str, reason: &str) {
        warn!(
            event = "request_rejected",
            service = %self.service,
            operation = op.as_str(),
            code = %code,
            reason = %reason,
            "Request rejected"
        );
    }

    pub fn log_rate_limited(&self, op: Operation, client: &str, reset_after_secs: u64) {
        warn!(
            event = "rate_limited",
            service = %self.service,
            operation = op.as_str(),
            client = %client,
            reset_after_secs = reset_after_secs,
            "Rate limit exceeded"
        );
    }

    pub fn log_startup(&self, version: &str, bind: &str, catalog_skus: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            bind = %bind,
            catalog_skus = catalog_skus,
            "Sizing service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Sizing service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_metrics_record() {
        let metrics = EngineMetrics::new();

        metrics.observe_evaluation(Operation::Estimate, 0.0001);
        metrics.inc_invalid_builds();
        metrics.inc_rate_limited(Operation::Leak);
        metrics.set_catalog_skus(7);

        let before = metrics.requests(Operation::Recommend, "ok");
        metrics.inc_request(Operation::Recommend, "ok");
        assert_eq!(metrics.requests(Operation::Recommend, "ok"), before + 1);
    }

    #[test]
    fn test_handles_share_registry() {
        let a = EngineMetrics::new();
        let b = a.clone();
        let before = b.requests(Operation::Validate, "invalid");
        a.inc_request(Operation::Validate, "invalid");
        assert_eq!(b.requests(Operation::Validate, "invalid"), before + 1);
    }

    #[test]
    fn test_operation_labels() {
        let labels: Vec<_> = Operation::ALL.iter().map(|op| op.to_string()).collect();
        assert_eq!(labels, vec!["estimate", "validate", "recommend", "leak"]);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("sizing-api");
        assert_eq!(logger.service, "sizing-api");
    }
}
