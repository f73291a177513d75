//! Metrics configuration (`[metrics]` section)

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Route serving the Prometheus text format
    #[serde(default = "default_metrics_path")]
    pub path: String,
    /// Histogram buckets (seconds) for answer generation time. Local models
    /// take tens of seconds, well past the exporter's defaults.
    #[serde(default = "default_generation_buckets")]
    pub generation_buckets: Vec<f64>,
}

fn default_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_generation_buckets() -> Vec<f64> {
    vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 80.0, 160.0, 300.0]
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_metrics_path(),
            generation_buckets: default_generation_buckets(),
        }
    }
}
