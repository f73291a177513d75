//! Per-project endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, FrequentQuestionsQuery, FrequentQuestionsResponse, Json, WarmRequest, WarmResponse,
};
use crate::domain::validate_project_id;

/// GET /v1/projects/{project_id}/frequent-questions?limit=
pub async fn frequent_questions(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<FrequentQuestionsQuery>,
) -> Result<Json<FrequentQuestionsResponse>, ApiError> {
    validate_project_id(&project_id)?;

    let frequent_questions = state
        .cache
        .frequent_questions(&project_id, query.limit)
        .await?;

    Ok(Json(FrequentQuestionsResponse {
        project_id,
        frequent_questions,
    }))
}

/// POST /v1/projects/{project_id}/warm
///
/// Schedules background warming and returns immediately.
pub async fn warm_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(request): Json<WarmRequest>,
) -> Result<(StatusCode, Json<WarmResponse>), ApiError> {
    let source = request.into_source().ok_or_else(|| {
        ApiError::bad_request("Must specify questions or a project kind").with_param("kind")
    })?;

    // Runs detached; the outcome is logged.
    let _ = state.warmup.spawn(project_id.as_str(), source)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(WarmResponse {
            status: "scheduled",
            project_id,
        }),
    ))
}
