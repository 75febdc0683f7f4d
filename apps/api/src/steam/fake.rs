//! In-memory `StoreSource` for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::game::{GameMetadata, SearchHit};
use crate::models::review::{ReviewPage, ReviewRecord, ReviewSummary};
use crate::steam::{ReviewQuery, SteamError, StoreSource};

/// Serves canned games and reviews. Cursors are stringified offsets.
#[derive(Default)]
pub struct FakeStore {
    pub games: HashMap<u32, GameMetadata>,
    pub reviews: HashMap<u32, Vec<ReviewRecord>>,
    /// App ids whose review and metadata fetches fail.
    pub failing: HashSet<u32>,
    pub review_calls: Mutex<Vec<u32>>,
}

impl FakeStore {
    pub fn with_game(mut self, game: GameMetadata, reviews: Vec<ReviewRecord>) -> Self {
        self.reviews.insert(game.app_id, reviews);
        self.games.insert(game.app_id, game);
        self
    }

    pub fn failing(mut self, app_id: u32) -> Self {
        self.failing.insert(app_id);
        self
    }

    pub fn review_calls(&self) -> Vec<u32> {
        self.review_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

fn unavailable() -> SteamError {
    SteamError::Status {
        status: 503,
        body: "fake outage".to_string(),
    }
}

#[async_trait]
impl StoreSource for FakeStore {
    async fn fetch_reviews(
        &self,
        app_id: u32,
        query: &ReviewQuery,
    ) -> Result<ReviewPage, SteamError> {
        if let Ok(mut calls) = self.review_calls.lock() {
            calls.push(app_id);
        }
        if self.failing.contains(&app_id) {
            return Err(unavailable());
        }

        let all = self.reviews.get(&app_id).cloned().unwrap_or_default();
        let offset: usize = query.cursor.parse().unwrap_or(0);
        let per_page = query.num_per_page.max(1) as usize;
        let page: Vec<ReviewRecord> = all.iter().skip(offset).take(per_page).cloned().collect();
        let next = offset + page.len();

        Ok(ReviewPage {
            reviews: page,
            cursor: next.to_string(),
            summary: ReviewSummary {
                num_reviews: all.len() as u64,
                total_reviews: all.len() as u64,
                ..Default::default()
            },
            fallback: false,
        })
    }

    async fn fetch_game(&self, app_id: u32) -> Result<Option<GameMetadata>, SteamError> {
        if self.failing.contains(&app_id) {
            return Err(unavailable());
        }
        Ok(self.games.get(&app_id).cloned())
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, SteamError> {
        let term = term.to_lowercase();
        let mut hits: Vec<SearchHit> = self
            .games
            .values()
            .filter(|g| g.name.to_lowercase().contains(&term))
            .map(|g| SearchHit {
                app_id: g.app_id,
                name: g.name.clone(),
                tiny_image: g.header_image.clone(),
            })
            .collect();
        hits.sort_by_key(|h| h.app_id);
        Ok(hits)
    }
}

pub fn make_game(app_id: u32, name: &str, genres: &[&str]) -> GameMetadata {
    GameMetadata {
        app_id,
        name: name.to_string(),
        header_image: format!("https://cdn.example/{app_id}.jpg"),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ..Default::default()
    }
}

/// A review that clears the best-reviews quality gate.
pub fn make_review(app_id: u32, rec_id: &str, author: &str, upvotes: u64) -> ReviewRecord {
    ReviewRecord {
        source_recommendation_id: rec_id.to_string(),
        game_id: app_id,
        author_id: author.to_string(),
        created_at: 1_690_000_000,
        text: "Solid mechanics and a long campaign. ".repeat(5),
        recommended: true,
        upvotes,
        author_playtime_at_review_minutes: 1_200,
        purchase_verified: true,
        ..Default::default()
    }
}
