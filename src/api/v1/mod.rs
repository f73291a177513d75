//! v1 API endpoints

pub mod ask;
pub mod cache;
pub mod projects;
pub mod unit_tests;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask::ask))
        .route("/ask/plain", post(ask::ask_plain))
        .route("/unit-tests", post(unit_tests::generate_unit_test))
        .route("/cache/stats", get(cache::cache_stats))
        .route("/cache/clear", post(cache::clear_cache))
        .route("/cache/projects", get(cache::cached_projects))
        .route(
            "/projects/{project_id}/frequent-questions",
            get(projects::frequent_questions),
        )
        .route("/projects/{project_id}/warm", post(projects::warm_project))
}
