//! Scoring pipeline endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::types::PipelineReport;
use crate::AppState;

/// API response wrapper.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/run", post(run_pipeline))
}

/// Score the whole working set. Per-ticker failures come back in the
/// report; only storage failures surface as errors.
async fn run_pipeline(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PipelineReport>>, AppError> {
    let report = state.pipeline.run().await?;
    Ok(Json(ApiResponse::new(report)))
}
