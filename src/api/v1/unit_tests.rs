//! Unit-test synthesis endpoint

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UnitTestRequest, UnitTestResponse};

/// POST /v1/unit-tests
///
/// `tests` is empty when the base project has nothing for the file.
pub async fn generate_unit_test(
    State(state): State<AppState>,
    Json(request): Json<UnitTestRequest>,
) -> Result<Json<UnitTestResponse>, ApiError> {
    info!(
        feature_id = %request.feature_id,
        file_name = %request.file_name,
        "Generating unit test"
    );

    let test = state
        .test_synthesis
        .synthesize_test(&request.feature_id, &request.file_name)
        .await?;

    Ok(Json(UnitTestResponse {
        status: "success",
        tests: test.into_iter().collect(),
    }))
}
