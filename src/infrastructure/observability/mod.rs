//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_cache_lookup, record_eviction,
    record_generation, record_http_request, GenerationMetricParams, PrometheusMetrics,
};
