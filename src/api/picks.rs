//! Pick selection, persistence, and tracking endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::scoring::ApiResponse;
use crate::error::AppError;
use crate::services::convergence::PersistReport;
use crate::types::{ConvergenceCandidate, GuaranteedPick, OutcomeCounts, PerformanceStats};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PersistQuery {
    pub force: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/top", get(top_candidates))
        .route("/grid", get(grid))
        .route("/persist", post(persist))
        .route("/date/:date", get(picks_for_date))
        .route("/stats", get(stats))
        .route("/track", post(track))
}

/// Today's strongest candidates, computed on the fly (nothing persisted).
async fn top_candidates(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> Json<ApiResponse<Vec<ConvergenceCandidate>>> {
    Json(ApiResponse::new(state.convergence.top_candidates(query.n)))
}

/// Convergence scores across the whole filtered universe.
async fn grid(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ConvergenceCandidate>>> {
    Json(ApiResponse::new(state.convergence.score_universe()))
}

/// Persist today's picks. Idempotent unless `force=true`.
async fn persist(
    State(state): State<AppState>,
    Query(query): Query<PersistQuery>,
) -> Result<Json<ApiResponse<PersistReport>>, AppError> {
    let report = state
        .convergence
        .persist_top(query.force.unwrap_or(false))
        .await?;
    Ok(Json(ApiResponse::new(report)))
}

/// Picks made on one date, rank ascending.
async fn picks_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ApiResponse<Vec<GuaranteedPick>>>, AppError> {
    let date: NaiveDate = date
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", date)))?;
    Ok(Json(ApiResponse::new(state.picks.for_date(date))))
}

/// Aggregate performance across all tracked picks.
async fn stats(State(state): State<AppState>) -> Json<ApiResponse<PerformanceStats>> {
    Json(ApiResponse::new(state.picks.performance_stats()))
}

/// Run an outcome-tracking sweep over every due pick.
async fn track(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OutcomeCounts>>, AppError> {
    let counts = state.tracker.track_pending().await?;
    Ok(Json(ApiResponse::new(counts)))
}
