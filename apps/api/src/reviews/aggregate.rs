//! Cross-game aggregation over a `StoreSource`.
//!
//! Fan-out/fan-in: each game is fetched independently, a failure only costs
//! that game's reviews, and results are merged after every fetch finished.
//! Fetches run one after another with a short pause to stay polite upstream.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::game::GameSummary;
use crate::reviews::identity::{encode_review_id, fingerprint_matches, ReviewId};
use crate::reviews::scoring::{ReviewScorer, ScoreOptions};
use crate::reviews::selection::{is_placeholder, select_best_reviews, CandidateGame, RankedReview};
use crate::steam::{ReviewQuery, SteamError, StoreSource, MAX_REVIEWS_PER_PAGE};

/// Upper bound on games fetched per aggregation run.
pub const MAX_GAMES_PER_RUN: usize = 15;

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Pause between two games' fetches.
    pub fetch_delay: Duration,
    pub reviews_per_game: u32,
    pub scorer: Arc<ReviewScorer>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            fetch_delay: Duration::from_millis(50),
            reviews_per_game: 50,
            scorer: Arc::new(ReviewScorer::default()),
        }
    }
}

/// Fetches reviews and metadata for up to `MAX_GAMES_PER_RUN` games, in order.
///
/// A game whose review fetch fails is kept with zero reviews. A metadata
/// failure keeps the reviews under a bare summary.
pub async fn collect_candidates(
    source: &dyn StoreSource,
    app_ids: &[u32],
    opts: &AggregateOptions,
) -> Vec<CandidateGame> {
    let query = ReviewQuery {
        num_per_page: opts.reviews_per_game,
        ..Default::default()
    };

    let mut candidates = Vec::with_capacity(app_ids.len().min(MAX_GAMES_PER_RUN));

    for (i, &app_id) in app_ids.iter().take(MAX_GAMES_PER_RUN).enumerate() {
        if i > 0 && !opts.fetch_delay.is_zero() {
            tokio::time::sleep(opts.fetch_delay).await;
        }

        let reviews = match source.fetch_reviews(app_id, &query).await {
            Ok(page) => page.reviews,
            Err(e) => {
                warn!("Skipping reviews for app {app_id}: {e}");
                Vec::new()
            }
        };

        let game = if reviews.is_empty() {
            GameSummary::unknown(app_id)
        } else {
            match source.fetch_game(app_id).await {
                Ok(Some(meta)) => meta.summary(),
                Ok(None) => GameSummary::unknown(app_id),
                Err(e) => {
                    warn!("No metadata for app {app_id}: {e}");
                    GameSummary::unknown(app_id)
                }
            }
        };

        debug!("Collected {} reviews for app {app_id}", reviews.len());
        candidates.push(CandidateGame { game, reviews });
    }

    candidates
}

/// The cross-game "best reviews" list.
pub async fn best_reviews(
    source: &dyn StoreSource,
    app_ids: &[u32],
    limit: usize,
    now: i64,
    opts: &AggregateOptions,
) -> Vec<RankedReview> {
    let candidates = collect_candidates(source, app_ids, opts).await;
    let selected = select_best_reviews(candidates, limit, now, &opts.scorer);
    info!("Selected {} best reviews (limit {limit})", selected.len());
    selected
}

/// Reviews written by `author_id` across the given games, newest first.
pub async fn reviews_by_author(
    source: &dyn StoreSource,
    app_ids: &[u32],
    author_id: &str,
    limit: usize,
    opts: &AggregateOptions,
) -> Vec<RankedReview> {
    let candidates = collect_candidates(source, app_ids, opts).await;

    let mut found: Vec<RankedReview> = candidates
        .into_iter()
        .flat_map(|CandidateGame { game, reviews }| {
            reviews
                .into_iter()
                .filter(|r| r.author_id == author_id && !is_placeholder(r))
                .map(move |review| RankedReview {
                    unique_id: encode_review_id(&review, game.app_id),
                    quality_score: opts.scorer.score(&review, ScoreOptions::base()),
                    game: game.clone(),
                    review,
                })
        })
        .collect();

    found.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));
    found.truncate(limit);
    found
}

/// Re-scans a game's reviews, page by page, for the one `id` was derived from.
///
/// Stops after `max_pages` pages, on an empty page, or when the cursor stops moving.
pub async fn find_review(
    source: &dyn StoreSource,
    id: &ReviewId,
    max_pages: u32,
    scorer: &ReviewScorer,
) -> Result<Option<RankedReview>, SteamError> {
    let mut query = ReviewQuery {
        num_per_page: MAX_REVIEWS_PER_PAGE,
        ..Default::default()
    };

    for page_no in 0..max_pages {
        let page = source.fetch_reviews(id.game_id, &query).await?;

        if let Some(review) = page
            .reviews
            .into_iter()
            .find(|r| !is_placeholder(r) && fingerprint_matches(r, id))
        {
            debug!("Found review {} on page {page_no}", id.fingerprint);
            let game = match source.fetch_game(id.game_id).await {
                Ok(Some(meta)) => meta.summary(),
                Ok(None) => GameSummary::unknown(id.game_id),
                Err(e) => {
                    warn!("No metadata for app {}: {e}", id.game_id);
                    GameSummary::unknown(id.game_id)
                }
            };
            return Ok(Some(RankedReview {
                unique_id: encode_review_id(&review, id.game_id),
                quality_score: scorer.score(&review, ScoreOptions::base()),
                game,
                review,
            }));
        }

        if page.cursor.is_empty() || page.cursor == query.cursor {
            break;
        }
        query.cursor = page.cursor;
    }

    Ok(None)
}
