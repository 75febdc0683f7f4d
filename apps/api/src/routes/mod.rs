pub mod health;

use axum::{routing::get, Router};

use crate::games::handlers as games;
use crate::reviews::handlers as reviews;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Games
        .route("/api/v1/games/:app_id", get(games::handle_get_game))
        .route("/api/v1/search", get(games::handle_search))
        // Reviews
        .route(
            "/api/v1/games/:app_id/reviews",
            get(reviews::handle_list_reviews),
        )
        .route("/api/v1/reviews/best", get(reviews::handle_best_reviews))
        .route("/api/v1/reviews/:review_id", get(reviews::handle_get_review))
        .route(
            "/api/v1/users/:author_id/reviews",
            get(reviews::handle_user_reviews),
        )
        .with_state(state)
}
