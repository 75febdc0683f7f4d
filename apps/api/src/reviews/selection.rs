//! Best-review selection. Ranks reviews pulled from many games into a short,
//! genre-diverse list.
//!
//! Algorithm:
//! 1. Drop placeholder reviews (upstream stand-ins, never real)
//! 2. Score (extended variant) and assign a review id
//! 3. Per game: apply the quality gate, keep the top `max(2, 2*limit/games)`
//! 4. Merge and stable-sort descending by score
//! 5. Greedy walk with a per-game cap of 2; past `limit`, keep accepting reviews
//!    that add an unseen genre until `limit * 1.5`
//! 6. Truncate to `limit`
//!
//! Pure: no I/O, `now` is passed in. Fetching lives in `reviews::aggregate`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::game::GameSummary;
use crate::models::review::ReviewRecord;
use crate::reviews::identity::encode_review_id;
use crate::reviews::scoring::{ReviewScorer, ScoreOptions};

/// Substring marking an upstream placeholder review.
pub const FALLBACK_MARKER: &str = "fallback";
pub const PER_GAME_CAP: usize = 2;
/// Overflow window for genre substitution during the walk.
pub const DIVERSITY_WINDOW: f64 = 1.5;

const GATE_MIN_SCORE: u32 = 25;
const GATE_MIN_CHARS: usize = 50;
const GATE_MIN_UPVOTES: u64 = 2;
const GATE_MIN_PLAYTIME_MINUTES: u64 = 60;

/// One game's reviews, in upstream fetch order.
#[derive(Debug, Clone)]
pub struct CandidateGame {
    pub game: GameSummary,
    pub reviews: Vec<ReviewRecord>,
}

/// A review surfaced to callers together with its score, id and game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedReview {
    pub unique_id: String,
    pub quality_score: u32,
    pub review: ReviewRecord,
    pub game: GameSummary,
}

pub fn is_placeholder(review: &ReviewRecord) -> bool {
    review.source_recommendation_id.contains(FALLBACK_MARKER)
}

/// Hard floor: a review must clear every threshold to be ranked at all.
pub fn passes_quality_gate(review: &ReviewRecord, score: u32) -> bool {
    score > GATE_MIN_SCORE
        && review.text_len() > GATE_MIN_CHARS
        && review.upvotes > GATE_MIN_UPVOTES
        && review.author_playtime_at_review_minutes > GATE_MIN_PLAYTIME_MINUTES
}

/// Reviews kept per game before the global pass.
pub fn per_game_keep(limit: usize, game_count: usize) -> usize {
    if game_count == 0 {
        return PER_GAME_CAP;
    }
    PER_GAME_CAP.max(limit.saturating_mul(2) / game_count)
}

pub fn select_best_reviews(
    candidates: Vec<CandidateGame>,
    limit: usize,
    now: i64,
    scorer: &ReviewScorer,
) -> Vec<RankedReview> {
    if limit == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let keep = per_game_keep(limit, candidates.len());
    let opts = ScoreOptions::extended(now);

    let mut pool: Vec<RankedReview> = Vec::new();
    for CandidateGame { game, reviews } in candidates {
        let mut ranked: Vec<RankedReview> = reviews
            .into_iter()
            .filter(|review| !is_placeholder(review))
            .map(|review| RankedReview {
                unique_id: encode_review_id(&review, game.app_id),
                quality_score: scorer.score(&review, opts),
                game: game.clone(),
                review,
            })
            .filter(|ranked| passes_quality_gate(&ranked.review, ranked.quality_score))
            .collect();

        sort_by_score(&mut ranked);
        ranked.truncate(keep);
        pool.extend(ranked);
    }

    sort_by_score(&mut pool);

    let mut selected = diverse_walk(pool, limit);
    selected.truncate(limit);
    selected
}

/// `sort_by` is stable, so equal scores keep fetch order.
fn sort_by_score(ranked: &mut [RankedReview]) {
    ranked.sort_by(|a, b| b.quality_score.cmp(&a.quality_score));
}

/// Greedy pass over a score-sorted pool. May return up to `limit * 1.5` items.
fn diverse_walk(sorted: Vec<RankedReview>, limit: usize) -> Vec<RankedReview> {
    let ceiling = (limit as f64 * DIVERSITY_WINDOW).floor() as usize;

    let mut per_game: HashMap<u32, usize> = HashMap::new();
    let mut seen_genres: HashSet<String> = HashSet::new();
    let mut selected = Vec::new();

    for candidate in sorted {
        if selected.len() >= ceiling {
            break;
        }

        let app_id = candidate.game.app_id;
        if per_game.get(&app_id).copied().unwrap_or(0) >= PER_GAME_CAP {
            continue;
        }

        let adds_genre = candidate
            .game
            .genres
            .iter()
            .any(|g| !seen_genres.contains(g));

        if selected.len() < limit || adds_genre {
            *per_game.entry(app_id).or_insert(0) += 1;
            seen_genres.extend(candidate.game.genres.iter().cloned());
            selected.push(candidate);
        }
    }

    selected
}
