pub mod health;
pub mod picks;
pub mod scoring;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/scoring", scoring::router())
        .nest("/api/picks", picks::router())
}
