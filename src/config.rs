//! Environment-driven service configuration.

use anyhow::{bail, Result};
use std::time::Duration;
use tracing::warn;

/// YouTube Data API caps `maxResults` for commentThreads at 100.
pub const PROVIDER_MAX_BATCH: usize = 100;
/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub youtube_api_key: String,
    pub youtube_api_url: String,
    pub translate_url: String,
    pub translate_api_key: Option<String>,
    pub translate_enabled: bool,
    /// Corpus cap: never fetch more than this many comments per request.
    pub max_comments: usize,
    pub batch_size: usize,
    pub workers: usize,
    pub http_timeout: Duration,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let youtube_api_key = match get("YOUTUBE_API_KEY") {
            Some(key) => key,
            None => bail!("YOUTUBE_API_KEY must be set"),
        };

        let batch_size = parse_or(get("FETCH_BATCH_SIZE"), "FETCH_BATCH_SIZE", PROVIDER_MAX_BATCH)
            .clamp(1, PROVIDER_MAX_BATCH);
        let workers = parse_or(get("ANALYSIS_WORKERS"), "ANALYSIS_WORKERS", 8).max(1);
        let timeout_secs: u64 = parse_or(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 15);

        let translate_enabled = match get("TRANSLATE_ENABLED").map(|v| v.to_lowercase()) {
            Some(v) if v == "false" || v == "0" || v == "off" => false,
            _ => true,
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            youtube_api_key,
            youtube_api_url: get("YOUTUBE_API_URL").unwrap_or_else(|| {
                "https://www.googleapis.com/youtube/v3/commentThreads".to_string()
            }),
            translate_url: get("TRANSLATE_URL")
                .unwrap_or_else(|| "https://libretranslate.com/translate".to_string()),
            translate_api_key: get("TRANSLATE_API_KEY"),
            translate_enabled,
            max_comments: parse_or(get("MAX_COMMENTS"), "MAX_COMMENTS", 100),
            batch_size,
            workers,
            http_timeout: Duration::from_secs(timeout_secs.max(1)),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3001".to_string()),
            cors_origins,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match raw {
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!("⚠️ {}={:?} is not a valid number, using {}", key, s, default);
            default
        }),
        None => default,
    }
}
