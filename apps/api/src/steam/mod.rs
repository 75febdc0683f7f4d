//! Steam storefront client: the single point of entry for upstream data.
//!
//! Every route and aggregation reads games and reviews through `StoreSource`;
//! `SteamClient` is the production implementation. Results are cached per
//! request URL through the injected `ResponseCache`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::models::game::{GameMetadata, SearchHit};
use crate::models::review::ReviewPage;

pub mod models;
pub mod placeholder;

#[cfg(test)]
pub mod fake;

use self::models::{AppDetailsResponse, AppReviewsResponse, StoreSearchResponse};

pub const DEFAULT_STORE_URL: &str = "https://store.steampowered.com";
const MAX_ATTEMPTS: u32 = 3;
pub const MAX_REVIEWS_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum SteamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Steam returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Steam reported failure for app {app_id}")]
    Unsuccessful { app_id: u32 },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Query parameters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFilter {
    Recent,
    Updated,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    #[default]
    All,
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    #[default]
    All,
    Steam,
    NonSteamPurchase,
}

impl ReviewFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Updated => "updated",
            Self::All => "all",
        }
    }
}

impl ReviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl PurchaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Steam => "steam",
            Self::NonSteamPurchase => "non_steam_purchase",
        }
    }
}

/// One page request against `/appreviews`. The cursor is opaque; `*` is the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuery {
    pub cursor: String,
    pub filter: ReviewFilter,
    pub review_type: ReviewType,
    pub purchase_type: PurchaseType,
    pub num_per_page: u32,
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            cursor: "*".to_string(),
            filter: ReviewFilter::All,
            review_type: ReviewType::All,
            purchase_type: PurchaseType::All,
            num_per_page: 20,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Source trait
// ────────────────────────────────────────────────────────────────────────────

/// Upstream game and review data. Carried in `AppState` as `Arc<dyn StoreSource>`.
#[async_trait]
pub trait StoreSource: Send + Sync {
    async fn fetch_reviews(&self, app_id: u32, query: &ReviewQuery)
        -> Result<ReviewPage, SteamError>;

    /// `Ok(None)` when the store does not know the app.
    async fn fetch_game(&self, app_id: u32) -> Result<Option<GameMetadata>, SteamError>;

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, SteamError>;
}

// ────────────────────────────────────────────────────────────────────────────
// SteamClient
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub reviews: Duration,
    pub games: Duration,
    pub search: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            reviews: Duration::from_secs(300),
            games: Duration::from_secs(3600),
            search: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SteamClientConfig {
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
    /// First retry waits this long, doubling after each attempt.
    pub retry_base_delay: Duration,
    pub ttls: CacheTtls,
}

impl Default for SteamClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            language: "english".to_string(),
            timeout: Duration::from_secs(10),
            retry_base_delay: Duration::from_millis(250),
            ttls: CacheTtls::default(),
        }
    }
}

#[derive(Clone)]
pub struct SteamClient {
    client: Client,
    config: SteamClientConfig,
    cache: Arc<dyn ResponseCache>,
}

impl SteamClient {
    pub fn new(config: SteamClientConfig, cache: Arc<dyn ResponseCache>) -> Result<Self, SteamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reviewhub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, SteamError> {
        let base = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse_with_params(&base, params).map_err(|e| SteamError::InvalidUrl(e.to_string()))
    }

    /// Returns the cached value for `url` if present, otherwise fetches, converts
    /// and caches it. Only successful conversions are cached.
    async fn cached<W, T, F>(&self, url: Url, ttl: Duration, convert: F) -> Result<T, SteamError>
    where
        W: DeserializeOwned,
        T: Serialize + DeserializeOwned,
        F: FnOnce(W) -> Result<T, SteamError>,
    {
        let key = url.to_string();

        if let Some(hit) = self.cache.get(&key).await {
            match serde_json::from_value::<T>(hit) {
                Ok(value) => {
                    debug!("Cache hit: {key}");
                    return Ok(value);
                }
                Err(e) => warn!("Discarding unreadable cache entry for {key}: {e}"),
            }
        }

        let wire: W = self.get_json(url).await?;
        let value = convert(wire)?;

        match serde_json::to_value(&value) {
            Ok(json) => self.cache.set(&key, json, ttl).await,
            Err(e) => warn!("Could not cache {key}: {e}"),
        }
        Ok(value)
    }

    /// GET with retries on 429, 5xx and transport errors (exponential backoff).
    async fn get_json<W: DeserializeOwned>(&self, url: Url) -> Result<W, SteamError> {
        let mut last_error: Option<SteamError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "Steam request attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            debug!("GET {url}");
            let response = match self.client.get(url.clone()).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SteamError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Steam returned {}: {}", status, body);
                last_error = Some(SteamError::Status {
                    status: status.as_u16(),
                    body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SteamError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(last_error.unwrap_or(SteamError::Status {
            status: 429,
            body: format!("gave up after {MAX_ATTEMPTS} attempts"),
        }))
    }
}

#[async_trait]
impl StoreSource for SteamClient {
    async fn fetch_reviews(
        &self,
        app_id: u32,
        query: &ReviewQuery,
    ) -> Result<ReviewPage, SteamError> {
        let url = self.url(
            &format!("/appreviews/{app_id}"),
            &[
                ("json", "1".to_string()),
                ("cursor", query.cursor.clone()),
                ("filter", query.filter.as_str().to_string()),
                ("language", self.config.language.clone()),
                ("review_type", query.review_type.as_str().to_string()),
                ("purchase_type", query.purchase_type.as_str().to_string()),
                (
                    "num_per_page",
                    query.num_per_page.clamp(1, MAX_REVIEWS_PER_PAGE).to_string(),
                ),
            ],
        )?;

        self.cached(url, self.config.ttls.reviews, |wire: AppReviewsResponse| {
            if !wire.success {
                return Err(SteamError::Unsuccessful { app_id });
            }
            Ok(ReviewPage {
                reviews: wire
                    .reviews
                    .into_iter()
                    .map(|r| r.into_record(app_id))
                    .collect(),
                cursor: wire.cursor,
                summary: wire.query_summary.into(),
                fallback: false,
            })
        })
        .await
    }

    async fn fetch_game(&self, app_id: u32) -> Result<Option<GameMetadata>, SteamError> {
        let url = self.url(
            "/api/appdetails",
            &[
                ("appids", app_id.to_string()),
                ("l", self.config.language.clone()),
            ],
        )?;

        self.cached(url, self.config.ttls.games, |mut wire: AppDetailsResponse| {
            Ok(wire
                .remove(&app_id.to_string())
                .filter(|entry| entry.success)
                .and_then(|entry| entry.data)
                .map(|data| data.into_metadata(app_id)))
        })
        .await
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, SteamError> {
        let url = self.url(
            "/api/storesearch/",
            &[
                ("term", term.to_string()),
                ("l", self.config.language.clone()),
                ("cc", "US".to_string()),
            ],
        )?;

        self.cached(url, self.config.ttls.search, |wire: StoreSearchResponse| {
            Ok(wire.items.into_iter().map(SearchHit::from).collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::clock::ManualClock;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> SteamClient {
        let config = SteamClientConfig {
            base_url: server.uri(),
            retry_base_delay: Duration::from_millis(1),
            ..Default::default()
        };
        let cache = Arc::new(MemoryCache::new(Arc::new(ManualClock::at_unix(1_700_000_000))));
        SteamClient::new(config, cache).unwrap()
    }

    fn reviews_body() -> serde_json::Value {
        json!({
            "success": 1,
            "query_summary": {
                "num_reviews": 1,
                "review_score": 8,
                "review_score_desc": "Very Positive",
                "total_positive": 900,
                "total_negative": 100,
                "total_reviews": 1000
            },
            "reviews": [{
                "recommendationid": "111",
                "author": {"steamid": "765", "num_reviews": 3, "playtime_at_review": 600},
                "review": "Fun with friends.",
                "timestamp_created": 1690000000,
                "voted_up": true,
                "votes_up": 10,
                "votes_funny": 0,
                "weighted_vote_score": "0.6",
                "steam_purchase": true
            }],
            "cursor": "AoJ4"
        })
    }

    #[tokio::test]
    async fn test_fetch_reviews_parses_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appreviews/730"))
            .and(query_param("json", "1"))
            .and(query_param("cursor", "*"))
            .and(query_param("language", "english"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reviews_body()))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .fetch_reviews(730, &ReviewQuery::default())
            .await
            .unwrap();

        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].source_recommendation_id, "111");
        assert_eq!(page.reviews[0].game_id, 730);
        assert_eq!(page.cursor, "AoJ4");
        assert_eq!(page.summary.review_score_desc, "Very Positive");
        assert!(!page.fallback);
    }

    #[tokio::test]
    async fn test_second_fetch_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appreviews/730"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reviews_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.fetch_reviews(730, &ReviewQuery::default()).await.unwrap();
        let second = client.fetch_reviews(730, &ReviewQuery::default()).await.unwrap();
        assert_eq!(first.reviews, second.reviews);
    }

    #[tokio::test]
    async fn test_unsuccessful_payload_is_error_and_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appreviews/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 2})))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for _ in 0..2 {
            let err = client.fetch_reviews(1, &ReviewQuery::default()).await.unwrap_err();
            assert!(matches!(err, SteamError::Unsuccessful { app_id: 1 }));
        }
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appreviews/2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reviews(2, &ReviewQuery::default())
            .await
            .unwrap_err();
        match err {
            SteamError::Status { status, .. } => assert_eq!(status, 500),
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appreviews/3"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reviews(3, &ReviewQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SteamError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_game_maps_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/appdetails"))
            .and(query_param("appids", "620"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "620": {
                    "success": true,
                    "data": {
                        "steam_appid": 620,
                        "name": "Portal 2",
                        "header_image": "https://cdn/620.jpg",
                        "genres": [{"id": "1", "description": "Action"}, {"id": "25", "description": "Adventure"}]
                    }
                }
            })))
            .mount(&server)
            .await;

        let game = client_for(&server).fetch_game(620).await.unwrap().unwrap();
        assert_eq!(game.app_id, 620);
        assert_eq!(game.name, "Portal 2");
        assert_eq!(game.genres, vec!["Action", "Adventure"]);
    }

    #[tokio::test]
    async fn test_fetch_unknown_game_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/appdetails"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"999": {"success": false}})),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch_game(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_maps_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/storesearch/"))
            .and(query_param("term", "hollow knight"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "items": [{"type": "app", "id": 367520, "name": "Hollow Knight", "tiny_image": "https://cdn/t.jpg"}]
            })))
            .mount(&server)
            .await;

        let hits = client_for(&server).search("hollow knight").await.unwrap();
        assert_eq!(
            hits,
            vec![SearchHit {
                app_id: 367520,
                name: "Hollow Knight".to_string(),
                tiny_image: "https://cdn/t.jpg".to_string()
            }]
        );
    }
}
