//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_projects: Option<usize>,
}

/// Liveness: 200 while the process serves requests
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            cached_projects: None,
        }),
    )
}

/// Readiness: the cache is loaded and answering
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let cached_projects = state.cache.global_stats().await.total_projects;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ready",
            version: env!("CARGO_PKG_VERSION"),
            cached_projects: Some(cached_projects),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "1.0.0",
            cached_projects: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(!json.contains("cached_projects"));
    }
}
