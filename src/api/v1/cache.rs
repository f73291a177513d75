//! Cache administration endpoints

use axum::extract::{Query, State};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, CacheStatsQuery, CacheStatsResponse, CachedProjectsResponse, ClearCacheRequest,
    ClearCacheResponse, Json,
};
use crate::domain::validate_project_id;

/// GET /v1/cache/stats?project_id=
pub async fn cache_stats(
    State(state): State<AppState>,
    Query(query): Query<CacheStatsQuery>,
) -> Result<Json<CacheStatsResponse>, ApiError> {
    if let Some(ref project_id) = query.project_id {
        validate_project_id(project_id)?;
    }

    let stats = state.cache.stats(query.project_id.as_deref()).await;
    Ok(Json(CacheStatsResponse {
        status: "success",
        stats,
    }))
}

/// POST /v1/cache/clear
pub async fn clear_cache(
    State(state): State<AppState>,
    Json(request): Json<ClearCacheRequest>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let message = if request.clear_all {
        state.cache.clear_all().await?;
        "All caches cleared successfully".to_string()
    } else if request.clear_embeddings {
        state.cache.clear_embeddings().await?;
        "Embedding cache cleared successfully".to_string()
    } else if let Some(project_id) = request.project_id {
        validate_project_id(&project_id)?;
        if state.cache.clear_project(&project_id).await? {
            format!("Cache cleared for project {}", project_id)
        } else {
            format!("No cache to clear for project {}", project_id)
        }
    } else {
        return Err(ApiError::bad_request(
            "Must specify project_id, clear_embeddings=true, or clear_all=true",
        ));
    };

    Ok(Json(ClearCacheResponse {
        status: "success",
        message,
    }))
}

/// GET /v1/cache/projects
pub async fn cached_projects(State(state): State<AppState>) -> Json<CachedProjectsResponse> {
    let stats = state.cache.global_stats().await;

    Json(CachedProjectsResponse {
        status: "success",
        total_projects: stats.total_projects,
        projects: stats.projects,
        total_questions: stats.total_cached_questions,
    })
}
