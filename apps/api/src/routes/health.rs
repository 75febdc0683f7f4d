use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Games polled by the best-reviews aggregation.
    pub candidate_games: usize,
    pub keywords_version: u32,
}

/// GET /health
///
/// Liveness only: never calls Steam.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "reviewhub-api",
        version: env!("CARGO_PKG_VERSION"),
        candidate_games: state.config.best_reviews_app_ids.len(),
        keywords_version: state.config.content_keywords.version,
    })
}
