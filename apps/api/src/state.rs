use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::reviews::aggregate::AggregateOptions;
use crate::reviews::scoring::ReviewScorer;
use crate::steam::StoreSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Upstream games and reviews. Default: `SteamClient` over the configured cache.
    pub source: Arc<dyn StoreSource>,
    /// Supplies `now` for recency scoring.
    pub clock: Arc<dyn Clock>,
    /// Built once from `Config::content_keywords`.
    pub scorer: Arc<ReviewScorer>,
    pub config: Config,
}

impl AppState {
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            fetch_delay: self.config.fetch_delay,
            scorer: self.scorer.clone(),
            ..Default::default()
        }
    }
}
