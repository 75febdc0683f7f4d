//! Review identifiers: stable, URL-safe ids derived from a review's immutable fields.
//!
//! Format: `rv_<game id>_<12 lowercase hex>`, e.g. `rv_730_4f9a1c2e8b7d`.
//! The fingerprint is the first 12 hex characters of a SHA-256 digest over a
//! length-prefixed canonical string, so the same review always maps to the same
//! id and no lookup table needs to be stored. Decoding only recovers the game;
//! finding the review itself means re-scanning that game's reviews.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::review::ReviewRecord;

pub const ID_PREFIX: &str = "rv";
pub const FINGERPRINT_LEN: usize = 12;

static REVIEW_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rv_(\d+)_([0-9a-f]{12})$").expect("Invalid regex pattern for review id")
});

/// A decoded review identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewId {
    pub game_id: u32,
    pub fingerprint: String,
}

/// Derives the identifier for `review` under `game_id`.
///
/// `game_id` is authoritative even if `review.game_id` disagrees.
pub fn encode_review_id(review: &ReviewRecord, game_id: u32) -> String {
    format!("{ID_PREFIX}_{game_id}_{}", fingerprint(review, game_id))
}

/// Parses an identifier. Returns `None` for anything that is not a well-formed id.
pub fn decode_review_id(id: &str) -> Option<ReviewId> {
    let caps = REVIEW_ID_PATTERN.captures(id)?;
    let game_id = caps[1].parse::<u32>().ok().filter(|g| *g > 0)?;
    Some(ReviewId {
        game_id,
        fingerprint: caps[2].to_string(),
    })
}

/// True when `review`, encoded under the id's game, produces the id's fingerprint.
pub fn fingerprint_matches(review: &ReviewRecord, id: &ReviewId) -> bool {
    fingerprint(review, id.game_id) == id.fingerprint
}

fn fingerprint(review: &ReviewRecord, game_id: u32) -> String {
    let mut h = Sha256::new();
    h.update(canonical_string(review, game_id).as_bytes());
    let digest = format!("{:x}", h.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

/// `<len>:<value>` per field, joined by `|`. Length prefixes keep a `|` inside
/// a field from shifting the boundaries.
fn canonical_string(review: &ReviewRecord, game_id: u32) -> String {
    let created_at = review.created_at.to_string();
    let game_id = game_id.to_string();
    [
        review.source_recommendation_id.as_str(),
        review.author_id.as_str(),
        created_at.as_str(),
        game_id.as_str(),
    ]
    .iter()
    .map(|field| format!("{}:{}", field.len(), field))
    .collect::<Vec<_>>()
    .join("|")
}
