use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::models::review::{ReviewRecord, ReviewSummary};
use crate::reviews::aggregate::{best_reviews, find_review, reviews_by_author};
use crate::reviews::identity::{decode_review_id, encode_review_id};
use crate::reviews::scoring::ScoreOptions;
use crate::reviews::selection::RankedReview;
use crate::state::AppState;
use crate::steam::placeholder::placeholder_page;
use crate::steam::{PurchaseType, ReviewFilter, ReviewQuery, ReviewType, MAX_REVIEWS_PER_PAGE};

const DEFAULT_BEST_LIMIT: usize = 20;
const MAX_BEST_LIMIT: usize = 50;
const DEFAULT_AUTHOR_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Upstream order.
    #[default]
    Upstream,
    /// Base quality score, descending; ties keep upstream order.
    Quality,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListReviewsParams {
    pub cursor: Option<String>,
    pub filter: Option<ReviewFilter>,
    pub review_type: Option<ReviewType>,
    pub purchase_type: Option<PurchaseType>,
    pub num_per_page: Option<u32>,
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// A listed review with its id and base quality score.
#[derive(Debug, Serialize)]
pub struct ScoredReview {
    pub unique_id: String,
    pub quality_score: u32,
    #[serde(flatten)]
    pub review: ReviewRecord,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub app_id: u32,
    pub reviews: Vec<ScoredReview>,
    pub cursor: String,
    pub summary: ReviewSummary,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct RankedListResponse {
    pub reviews: Vec<RankedReview>,
    pub count: usize,
}

/// GET /api/v1/games/:app_id/reviews
///
/// Serves placeholder reviews (flagged `fallback`) when the store is down.
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Path(app_id): Path<u32>,
    Query(params): Query<ListReviewsParams>,
) -> Result<Json<ReviewListResponse>, AppError> {
    if app_id == 0 {
        return Err(AppError::Validation("app_id must be positive".to_string()));
    }
    let num_per_page = params.num_per_page.unwrap_or(20);
    if !(1..=MAX_REVIEWS_PER_PAGE).contains(&num_per_page) {
        return Err(AppError::Validation(format!(
            "num_per_page must be between 1 and {MAX_REVIEWS_PER_PAGE}"
        )));
    }

    let query = ReviewQuery {
        cursor: params.cursor.unwrap_or_else(|| "*".to_string()),
        filter: params.filter.unwrap_or_default(),
        review_type: params.review_type.unwrap_or_default(),
        purchase_type: params.purchase_type.unwrap_or_default(),
        num_per_page,
    };

    let page = match state.source.fetch_reviews(app_id, &query).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Serving placeholder reviews for app {app_id}: {e}");
            placeholder_page(app_id)
        }
    };

    let mut reviews: Vec<ScoredReview> = page
        .reviews
        .into_iter()
        .map(|review| ScoredReview {
            unique_id: encode_review_id(&review, app_id),
            quality_score: state.scorer.score(&review, ScoreOptions::base()),
            review,
        })
        .collect();

    if params.sort == SortOrder::Quality {
        reviews.sort_by(|a, b| b.quality_score.cmp(&a.quality_score));
    }

    Ok(Json(ReviewListResponse {
        app_id,
        reviews,
        cursor: page.cursor,
        summary: page.summary,
        fallback: page.fallback,
    }))
}

/// GET /api/v1/reviews/best
pub async fn handle_best_reviews(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RankedListResponse>, AppError> {
    let limit = validate_limit(params.limit, DEFAULT_BEST_LIMIT)?;
    let now = state.clock.now_unix();

    let reviews = best_reviews(
        state.source.as_ref(),
        &state.config.best_reviews_app_ids,
        limit,
        now,
        &state.aggregate_options(),
    )
    .await;

    if reviews.is_empty() {
        return Err(AppError::Unavailable(
            "No reviews are available right now".to_string(),
        ));
    }

    Ok(Json(RankedListResponse {
        count: reviews.len(),
        reviews,
    }))
}

/// GET /api/v1/reviews/:review_id
pub async fn handle_get_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<Json<RankedReview>, AppError> {
    let not_found = || AppError::NotFound(format!("Review {review_id} not found"));

    let id = decode_review_id(&review_id).ok_or_else(not_found)?;
    let review = find_review(
        state.source.as_ref(),
        &id,
        state.config.lookup_max_pages,
        &state.scorer,
    )
    .await?;
    review.map(Json).ok_or_else(not_found)
}

/// GET /api/v1/users/:author_id/reviews
pub async fn handle_user_reviews(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RankedListResponse>, AppError> {
    if author_id.trim().is_empty() {
        return Err(AppError::Validation("author_id must not be empty".to_string()));
    }
    let limit = validate_limit(params.limit, DEFAULT_AUTHOR_LIMIT)?;

    let reviews = reviews_by_author(
        state.source.as_ref(),
        &state.config.best_reviews_app_ids,
        &author_id,
        limit,
        &state.aggregate_options(),
    )
    .await;

    Ok(Json(RankedListResponse {
        count: reviews.len(),
        reviews,
    }))
}

fn validate_limit(limit: Option<usize>, default: usize) -> Result<usize, AppError> {
    let limit = limit.unwrap_or(default);
    if !(1..=MAX_BEST_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_BEST_LIMIT}"
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None, 20).unwrap(), 20);
        assert_eq!(validate_limit(Some(50), 20).unwrap(), 50);
        assert!(validate_limit(Some(0), 20).is_err());
        assert!(validate_limit(Some(51), 20).is_err());
    }
}
