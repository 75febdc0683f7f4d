use serde::{Deserialize, Serialize};

/// One community award attached to a review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Award {
    #[serde(default)]
    pub award_votes: u64,
}

/// A single user-authored recommendation for one game.
///
/// Every field defaults at the deserialization boundary: absent numbers are 0,
/// absent flags are false and absent strings are empty. The scorer and the
/// identifier codec rely on this and never see a partial record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewRecord {
    pub source_recommendation_id: String,
    pub game_id: u32,
    pub author_id: String,
    /// Unix seconds.
    pub created_at: i64,
    pub updated_at: i64,
    pub text: String,
    pub language: String,
    pub recommended: bool,
    pub upvotes: u64,
    pub funny_votes: u64,
    /// Upstream helpfulness signal in [0,1], passed through untouched.
    pub weighted_vote_score: String,
    pub comment_count: u64,
    pub purchase_verified: bool,
    pub received_for_free: bool,
    pub written_during_early_access: bool,
    pub author_review_count: u64,
    pub author_games_owned: u64,
    pub author_playtime_forever_minutes: u64,
    pub author_playtime_at_review_minutes: u64,
    pub author_playtime_recent_minutes: u64,
    pub awards: Vec<Award>,
}

impl ReviewRecord {
    /// Review length in characters, the unit every length rule is written in.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn total_award_votes(&self) -> u64 {
        self.awards
            .iter()
            .fold(0u64, |total, a| total.saturating_add(a.award_votes))
    }
}

/// Aggregate review statistics for one game, as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSummary {
    pub num_reviews: u64,
    pub review_score: u32,
    pub review_score_desc: String,
    pub total_positive: u64,
    pub total_negative: u64,
    pub total_reviews: u64,
}

/// One page of reviews for a game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewPage {
    pub reviews: Vec<ReviewRecord>,
    /// Opaque upstream cursor for the next page.
    pub cursor: String,
    pub summary: ReviewSummary,
    /// True when the page is made of placeholder reviews because the
    /// upstream fetch failed.
    #[serde(default)]
    pub fallback: bool,
}
