//! Wire shapes of the Steam storefront endpoints.
//!
//! Steam is loose with types (`success` is `1` on one endpoint and `true` on
//! another, `weighted_vote_score` is a number or a string), so the few fields
//! that vary are normalized here and everything else defaults.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::game::{GameMetadata, SearchHit};
use crate::models::review::{Award, ReviewRecord, ReviewSummary};

// ────────────────────────────────────────────────────────────────────────────
// /appreviews/{app_id}?json=1
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AppReviewsResponse {
    #[serde(default, deserialize_with = "loose_bool")]
    pub success: bool,
    #[serde(default)]
    pub query_summary: QuerySummary,
    #[serde(default)]
    pub reviews: Vec<SteamReview>,
    #[serde(default)]
    pub cursor: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuerySummary {
    pub num_reviews: u64,
    pub review_score: u32,
    pub review_score_desc: String,
    pub total_positive: u64,
    pub total_negative: u64,
    pub total_reviews: u64,
}

impl From<QuerySummary> for ReviewSummary {
    fn from(q: QuerySummary) -> Self {
        Self {
            num_reviews: q.num_reviews,
            review_score: q.review_score,
            review_score_desc: q.review_score_desc,
            total_positive: q.total_positive,
            total_negative: q.total_negative,
            total_reviews: q.total_reviews,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SteamReview {
    pub recommendationid: String,
    pub author: SteamAuthor,
    pub language: String,
    pub review: String,
    pub timestamp_created: i64,
    pub timestamp_updated: i64,
    pub voted_up: bool,
    pub votes_up: u64,
    pub votes_funny: u64,
    #[serde(deserialize_with = "loose_string")]
    pub weighted_vote_score: String,
    pub comment_count: u64,
    pub steam_purchase: bool,
    pub received_for_free: bool,
    pub written_during_early_access: bool,
    pub reactions: Vec<SteamReaction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SteamAuthor {
    pub steamid: String,
    pub num_games_owned: u64,
    pub num_reviews: u64,
    pub playtime_forever: u64,
    pub playtime_last_two_weeks: u64,
    pub playtime_at_review: u64,
}

/// Community award on a review; `count` is the number of votes for it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SteamReaction {
    pub reaction_type: u32,
    pub count: u64,
}

impl SteamReview {
    pub fn into_record(self, app_id: u32) -> ReviewRecord {
        ReviewRecord {
            source_recommendation_id: self.recommendationid,
            game_id: app_id,
            author_id: self.author.steamid,
            created_at: self.timestamp_created,
            updated_at: self.timestamp_updated,
            text: self.review,
            language: self.language,
            recommended: self.voted_up,
            upvotes: self.votes_up,
            funny_votes: self.votes_funny,
            weighted_vote_score: self.weighted_vote_score,
            comment_count: self.comment_count,
            purchase_verified: self.steam_purchase,
            received_for_free: self.received_for_free,
            written_during_early_access: self.written_during_early_access,
            author_review_count: self.author.num_reviews,
            author_games_owned: self.author.num_games_owned,
            author_playtime_forever_minutes: self.author.playtime_forever,
            author_playtime_at_review_minutes: self.author.playtime_at_review,
            author_playtime_recent_minutes: self.author.playtime_last_two_weeks,
            awards: self
                .reactions
                .into_iter()
                .map(|r| Award {
                    award_votes: r.count,
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// /api/appdetails?appids={app_id}
// ────────────────────────────────────────────────────────────────────────────

pub type AppDetailsResponse = HashMap<String, AppDetailsEntry>;

#[derive(Debug, Deserialize)]
pub struct AppDetailsEntry {
    #[serde(default, deserialize_with = "loose_bool")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<AppData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppData {
    pub steam_appid: u32,
    pub name: String,
    pub header_image: String,
    pub short_description: String,
    pub is_free: bool,
    pub genres: Vec<Genre>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub release_date: Option<ReleaseDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDate {
    pub coming_soon: bool,
    pub date: String,
}

impl AppData {
    pub fn into_metadata(self, requested_app_id: u32) -> GameMetadata {
        GameMetadata {
            app_id: if self.steam_appid > 0 {
                self.steam_appid
            } else {
                requested_app_id
            },
            name: self.name,
            header_image: self.header_image,
            short_description: self.short_description,
            genres: self.genres.into_iter().map(|g| g.description).collect(),
            developers: self.developers,
            publishers: self.publishers,
            release_date: self
                .release_date
                .map(|r| r.date)
                .filter(|d| !d.is_empty()),
            is_free: self.is_free,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// /api/storesearch/?term=...
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreSearchResponse {
    pub total: u64,
    pub items: Vec<StoreSearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreSearchItem {
    pub id: u32,
    pub name: String,
    pub tiny_image: String,
}

impl From<StoreSearchItem> for SearchHit {
    fn from(item: StoreSearchItem) -> Self {
        Self {
            app_id: item.id,
            name: item.name,
            tiny_image: item.tiny_image,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loose field helpers
// ────────────────────────────────────────────────────────────────────────────

fn loose_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
