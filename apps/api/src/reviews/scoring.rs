//! Review quality scoring.
//!
//! One additive function serves both call sites:
//! - base variant: single-review display and per-game listings
//! - extended variant: cross-game "best reviews", adds recency and content heuristics
//!
//! Rounding: every term is summed as `f64`, the total is clamped at 0 and floored
//! once at the end. `now` is always passed in, never read from the clock here.

#[cfg(test)]
use std::sync::LazyLock;

use crate::models::review::ReviewRecord;
use crate::reviews::keywords::ContentKeywords;

const BASE_SCORE: f64 = 10.0;
const HELPFULNESS_WEIGHT: f64 = 25.0;
const AWARD_CAP: f64 = 20.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const SHORT_TEXT_CHARS: usize = 100;

#[cfg(test)]
static DEFAULT_SCORER: LazyLock<ReviewScorer> = LazyLock::new(ReviewScorer::default);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreOptions {
    /// Adds the recency and content-heuristic rows.
    pub extended: bool,
    /// Unix seconds. Recency is only applied when this is set.
    pub now: Option<i64>,
}

impl ScoreOptions {
    pub fn base() -> Self {
        Self::default()
    }

    pub fn extended(now: i64) -> Self {
        Self {
            extended: true,
            now: Some(now),
        }
    }
}

/// Scores a review with the default keyword tables.
#[cfg(test)]
pub fn score_review(review: &ReviewRecord, opts: ScoreOptions) -> u32 {
    DEFAULT_SCORER.score(review, opts)
}

#[derive(Debug, Clone, Default)]
pub struct ReviewScorer {
    keywords: ContentKeywords,
}

impl ReviewScorer {
    pub fn new(keywords: ContentKeywords) -> Self {
        Self { keywords }
    }

    pub fn score(&self, review: &ReviewRecord, opts: ScoreOptions) -> u32 {
        self.raw_score(review, opts).max(0.0).floor() as u32
    }

    /// Unclamped, unrounded sum of all applicable rows.
    pub fn raw_score(&self, review: &ReviewRecord, opts: ScoreOptions) -> f64 {
        let mut score = BASE_SCORE
            + length_adjustment(review.text_len())
            + helpfulness_adjustment(review.upvotes, review.funny_votes)
            + upvote_adjustment(review.upvotes)
            + author_reviews_adjustment(review.author_review_count)
            + playtime_adjustment(review.author_playtime_at_review_minutes)
            + award_adjustment(review.total_award_votes());

        if review.author_playtime_recent_minutes > 0 {
            score += 5.0;
        }
        if review.purchase_verified {
            score += 10.0;
        }

        if opts.extended {
            if let Some(now) = opts.now {
                score += recency_adjustment(now, review.created_at);
            }
            score += self.content_adjustment(&review.text);
        }

        score
    }

    /// Keyword heuristics over the review text.
    pub fn content_adjustment(&self, text: &str) -> f64 {
        let kw = &self.keywords;
        let lower = text.to_lowercase();
        let mut adjustment = 0.0;

        if ContentKeywords::any_in(&kw.topics, &lower) {
            adjustment += 5.0;
        }
        if lower.contains(kw.pros_marker.as_str()) && lower.contains(kw.cons_marker.as_str()) {
            adjustment += 10.0;
        }
        if ContentKeywords::any_in(&kw.endorsements, &lower) {
            adjustment += 3.0;
        }
        if is_all_caps(text) || ContentKeywords::any_in(&kw.hype_markers, &lower) {
            adjustment -= 5.0;
        }
        if text.chars().count() < SHORT_TEXT_CHARS
            && ContentKeywords::any_in(&kw.generic_phrases, &lower)
        {
            adjustment -= 10.0;
        }
        if ContentKeywords::any_in(&kw.positive, &lower)
            && ContentKeywords::any_in(&kw.negative, &lower)
        {
            adjustment += 8.0;
        }

        adjustment
    }
}

fn length_adjustment(chars: usize) -> f64 {
    if chars > 500 {
        30.0
    } else if chars > 200 {
        20.0
    } else if chars > 100 {
        10.0
    } else if chars < 50 {
        -5.0
    } else {
        0.0
    }
}

fn helpfulness_adjustment(upvotes: u64, funny_votes: u64) -> f64 {
    let total = upvotes.saturating_add(funny_votes);
    if total == 0 {
        return 0.0;
    }
    (upvotes as f64 / total as f64) * HELPFULNESS_WEIGHT
}

fn upvote_adjustment(upvotes: u64) -> f64 {
    match upvotes {
        u if u > 100 => 20.0,
        u if u > 50 => 15.0,
        u if u > 20 => 10.0,
        u if u > 10 => 5.0,
        _ => 0.0,
    }
}

fn author_reviews_adjustment(review_count: u64) -> f64 {
    match review_count {
        c if c > 20 => 10.0,
        c if c > 10 => 5.0,
        _ => 0.0,
    }
}

fn playtime_adjustment(minutes_at_review: u64) -> f64 {
    let hours = minutes_at_review as f64 / 60.0;
    if hours > 100.0 {
        15.0
    } else if hours > 50.0 {
        10.0
    } else if hours > 20.0 {
        5.0
    } else if hours < 2.0 {
        -10.0
    } else {
        0.0
    }
}

fn award_adjustment(total_award_votes: u64) -> f64 {
    (2.0 * total_award_votes as f64).min(AWARD_CAP)
}

fn recency_adjustment(now: i64, created_at: i64) -> f64 {
    let age_days = now.saturating_sub(created_at) as f64 / SECONDS_PER_DAY;
    if age_days < 30.0 {
        5.0
    } else if age_days < 90.0 {
        3.0
    } else if age_days > 365.0 {
        -2.0
    } else {
        0.0
    }
}

/// At least one cased letter and no lowercase ones.
fn is_all_caps(text: &str) -> bool {
    let mut saw_upper = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            saw_upper = true;
        }
    }
    saw_upper
}
