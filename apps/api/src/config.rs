use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::reviews::keywords::ContentKeywords;
use crate::steam::{CacheTtls, SteamClientConfig, DEFAULT_STORE_URL};

/// Popular titles used as the candidate pool for cross-game aggregation.
pub const DEFAULT_BEST_REVIEWS_APP_IDS: [u32; 15] = [
    730, 570, 1_245_620, 1_086_940, 292_030, 413_150, 105_600, 367_520, 1_145_360, 620, 72_850,
    271_590, 814_380, 374_320, 252_950,
];

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but malformed value is a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub steam_store_url: String,
    pub steam_language: String,
    pub http_timeout: Duration,
    /// Selects the Redis response cache when set.
    pub redis_url: Option<String>,
    pub cache_ttls: CacheTtls,
    pub best_reviews_app_ids: Vec<u32>,
    pub fetch_delay: Duration,
    pub lookup_max_pages: u32,
    /// Content heuristics tables; `CONTENT_KEYWORDS_PATH` points at a JSON override.
    pub content_keywords: ContentKeywords,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            steam_store_url: DEFAULT_STORE_URL.to_string(),
            steam_language: "english".to_string(),
            http_timeout: Duration::from_secs(10),
            redis_url: None,
            cache_ttls: CacheTtls::default(),
            best_reviews_app_ids: DEFAULT_BEST_REVIEWS_APP_IDS.to_vec(),
            fetch_delay: Duration::from_millis(50),
            lookup_max_pages: 5,
            content_keywords: ContentKeywords::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: parse_or(&var, "PORT", defaults.port)?,
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
            steam_store_url: var("STEAM_STORE_URL").unwrap_or(defaults.steam_store_url),
            steam_language: var("STEAM_LANGUAGE").unwrap_or(defaults.steam_language),
            http_timeout: Duration::from_secs(parse_or(&var, "HTTP_TIMEOUT_SECS", 10)?),
            redis_url: var("REDIS_URL"),
            cache_ttls: CacheTtls {
                reviews: Duration::from_secs(parse_or(&var, "CACHE_TTL_REVIEWS_SECS", 300)?),
                games: Duration::from_secs(parse_or(&var, "CACHE_TTL_GAMES_SECS", 3600)?),
                search: Duration::from_secs(parse_or(&var, "CACHE_TTL_SEARCH_SECS", 600)?),
            },
            best_reviews_app_ids: match var("BEST_REVIEWS_APP_IDS") {
                Some(raw) => parse_app_ids(&raw)?,
                None => defaults.best_reviews_app_ids,
            },
            fetch_delay: Duration::from_millis(parse_or(&var, "FETCH_DELAY_MS", 50)?),
            lookup_max_pages: parse_or(&var, "LOOKUP_MAX_PAGES", defaults.lookup_max_pages)?,
            content_keywords: match var("CONTENT_KEYWORDS_PATH") {
                Some(path) => load_keywords(&path)?,
                None => defaults.content_keywords,
            },
        })
    }

    pub fn steam_client_config(&self) -> SteamClientConfig {
        SteamClientConfig {
            base_url: self.steam_store_url.clone(),
            language: self.steam_language.clone(),
            timeout: self.http_timeout,
            ttls: self.cache_ttls.clone(),
            ..Default::default()
        }
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn load_keywords(path: &str) -> Result<ContentKeywords> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CONTENT_KEYWORDS_PATH '{path}'"))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("CONTENT_KEYWORDS_PATH '{path}' is not a valid keyword table"))
}

fn parse_app_ids(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .ok()
                .filter(|id| *id > 0)
                .with_context(|| format!("BEST_REVIEWS_APP_IDS contains invalid app id '{s}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.steam_store_url, DEFAULT_STORE_URL);
        assert!(config.redis_url.is_none());
        assert_eq!(config.best_reviews_app_ids.len(), 15);
        assert_eq!(config.lookup_max_pages, 5);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("BEST_REVIEWS_APP_IDS", "730, 570,,440"),
            ("FETCH_DELAY_MS", "0"),
            ("CACHE_TTL_REVIEWS_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.best_reviews_app_ids, vec![730, 570, 440]);
        assert!(config.fetch_delay.is_zero());
        assert_eq!(config.cache_ttls.reviews, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_port_is_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_invalid_app_id_is_error() {
        assert!(Config::from_lookup(lookup(&[("BEST_REVIEWS_APP_IDS", "730,zero")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BEST_REVIEWS_APP_IDS", "0")])).is_err());
    }

    #[test]
    fn test_keyword_tables_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"version": 2, "topics": ["netcode"]}}"#).unwrap();

        let path = file.path().to_str().unwrap();
        let config = Config::from_lookup(lookup(&[("CONTENT_KEYWORDS_PATH", path)])).unwrap();

        assert_eq!(config.content_keywords.version, 2);
        assert_eq!(config.content_keywords.topics, vec!["netcode"]);
        assert_eq!(config.content_keywords.pros_marker, "pros");
    }

    #[test]
    fn test_missing_keyword_file_is_error() {
        let err = Config::from_lookup(lookup(&[(
            "CONTENT_KEYWORDS_PATH",
            "/nonexistent/reviewhub-keywords.json",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("CONTENT_KEYWORDS_PATH"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[("PORT", "  "), ("REDIS_URL", "")])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.redis_url.is_none());
    }
}
