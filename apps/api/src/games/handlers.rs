use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::game::{GameMetadata, SearchHit};
use crate::state::AppState;

const MAX_TERM_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub term: String,
    pub results: Vec<SearchHit>,
}

/// GET /api/v1/games/:app_id
pub async fn handle_get_game(
    State(state): State<AppState>,
    Path(app_id): Path<u32>,
) -> Result<Json<GameMetadata>, AppError> {
    if app_id == 0 {
        return Err(AppError::Validation("app_id must be positive".to_string()));
    }
    state
        .source
        .fetch_game(app_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Game {app_id} not found")))
}

/// GET /api/v1/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::Validation("q must not be empty".to_string()));
    }
    if term.chars().count() > MAX_TERM_CHARS {
        return Err(AppError::Validation(format!(
            "q must be at most {MAX_TERM_CHARS} characters"
        )));
    }

    let results = state.source.search(term).await?;
    Ok(Json(SearchResponse {
        term: term.to_string(),
        results,
    }))
}
