//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;
use crate::domain::{LookupOutcome, OutputShape};

const GENERATION_DURATION: &str = "answer_generation_duration_seconds";

static PROJECT_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/projects/[^/]+").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = match PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(GENERATION_DURATION.to_string()),
        &config.generation_buckets,
    ) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!("Invalid generation buckets, using defaults: {}", e);
            PrometheusBuilder::new()
        }
    };

    match builder.install_recorder() {
        Ok(handle) => {
            gauge!("repo_qa_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record how an answer cache lookup was resolved
pub fn record_cache_lookup(outcome: LookupOutcome) {
    counter!("answer_cache_lookups_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record entries evicted from a cache tier (`project` or `embedding`)
pub fn record_eviction(tier: &'static str, count: usize) {
    if count > 0 {
        counter!("answer_cache_evictions_total", "tier" => tier).increment(count as u64);
    }
}

/// Parameters for generation metrics
pub struct GenerationMetricParams<'a> {
    pub provider: &'a str,
    pub shape: OutputShape,
    pub duration: Duration,
    pub success: bool,
}

/// Record a completed (or failed) answer generation
pub fn record_generation(params: GenerationMetricParams) {
    let labels = [
        ("provider", params.provider.to_string()),
        (
            "mode",
            match params.shape {
                OutputShape::Text => "stream",
                OutputShape::Diagram => "buffered",
            }
            .to_string(),
        ),
        ("status", if params.success { "success" } else { "error" }.to_string()),
    ];

    counter!("answer_generations_total", &labels).increment(1);
    histogram!(GENERATION_DURATION, &labels)
        .record(params.duration.as_secs_f64());
}

/// Replace project identifiers so label cardinality stays bounded
fn sanitize_path(path: &str) -> String {
    let path = PROJECT_SEGMENT.replace_all(path, "/projects/{id}");

    if path.len() > 50 {
        path.chars().take(50).collect()
    } else {
        path.to_string()
    }
}
