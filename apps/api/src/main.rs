mod cache;
mod clock;
mod config;
mod errors;
mod games;
mod models;
mod reviews;
mod routes;
mod state;
mod steam;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::cache::{MemoryCache, RedisCache, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::reviews::scoring::ReviewScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::steam::SteamClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Malformed env values abort startup; missing ones take defaults
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ReviewHub API v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = build_cache(&config, clock.clone()).await;

    let steam = SteamClient::new(config.steam_client_config(), cache)?;
    info!(
        "Steam client initialized (store: {}, language: {})",
        config.steam_store_url, config.steam_language
    );

    let state = AppState {
        source: Arc::new(steam),
        clock,
        scorer: Arc::new(ReviewScorer::new(config.content_keywords.clone())),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set and reachable, otherwise an in-process cache.
async fn build_cache(config: &Config, clock: Arc<dyn Clock>) -> Arc<dyn ResponseCache> {
    if let Some(url) = &config.redis_url {
        match RedisCache::connect(url).await {
            Ok(redis) => return Arc::new(redis),
            Err(e) => warn!("Redis unavailable, using in-memory cache: {e}"),
        }
    }
    info!("In-memory response cache initialized");
    Arc::new(MemoryCache::new(clock))
}
