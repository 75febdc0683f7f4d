//! Placeholder reviews served when Steam cannot be reached.
//!
//! They keep the per-game listing page renderable during an outage. Every
//! placeholder id carries `FALLBACK_MARKER`, which is how ranking code
//! recognizes and drops them.

use crate::models::review::{ReviewPage, ReviewRecord};
use crate::reviews::selection::FALLBACK_MARKER;

const PLACEHOLDER_TEXTS: [&str; 2] = [
    "Reviews for this game are temporarily unavailable. Please check back in a few minutes.",
    "We could not reach the store to load player reviews right now.",
];

pub fn placeholder_reviews(app_id: u32) -> Vec<ReviewRecord> {
    PLACEHOLDER_TEXTS
        .iter()
        .enumerate()
        .map(|(n, text)| ReviewRecord {
            source_recommendation_id: format!("{FALLBACK_MARKER}_{app_id}_{n}"),
            game_id: app_id,
            author_id: FALLBACK_MARKER.to_string(),
            text: text.to_string(),
            recommended: true,
            weighted_vote_score: "0".to_string(),
            ..Default::default()
        })
        .collect()
}

pub fn placeholder_page(app_id: u32) -> ReviewPage {
    ReviewPage {
        reviews: placeholder_reviews(app_id),
        cursor: String::new(),
        summary: Default::default(),
        fallback: true,
    }
}
