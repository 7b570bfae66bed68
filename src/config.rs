use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::{pipeline::FilterThresholds, services::recommendations::DEFAULT_TOP_N};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Ratings table (user_id, anime_id, rating)
    #[serde(default = "default_ratings_path")]
    pub ratings_path: PathBuf,

    /// Anime metadata table (anime_id, name, ...)
    #[serde(default = "default_anime_path")]
    pub anime_path: PathBuf,

    /// Where the similarity matrix blob is cached
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Front-end assets served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Jikan (MyAnimeList) API base URL
    #[serde(default = "default_jikan_api_url")]
    pub jikan_api_url: String,

    /// Image returned whenever a poster lookup fails
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Sleep applied after every HTTP 429 from the image API
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,

    /// Total attempts per image lookup, first call included
    #[serde(default = "default_max_fetch_attempts")]
    pub max_fetch_attempts: u32,

    /// Cap on simultaneous outbound image lookups per request
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,

    /// Overall enrichment budget per request
    #[serde(default = "default_enrichment_deadline_ms")]
    pub enrichment_deadline_ms: u64,

    #[serde(default = "default_min_ratings")]
    pub min_item_ratings: usize,

    #[serde(default = "default_min_ratings")]
    pub min_user_ratings: usize,

    /// Recommendations returned per query
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_ratings_path() -> PathBuf {
    PathBuf::from("data/rating.csv")
}

fn default_anime_path() -> PathBuf {
    PathBuf::from("data/anime.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("anime_similarity_matrix.bin")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_jikan_api_url() -> String {
    "https://api.jikan.moe/v4".to_string()
}

fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/150x200?text=No+Image".to_string()
}

fn default_http_timeout_secs() -> u64 {
    5
}

fn default_rate_limit_backoff_ms() -> u64 {
    5_000
}

fn default_max_fetch_attempts() -> u32 {
    2
}

fn default_enrichment_concurrency() -> usize {
    3
}

fn default_enrichment_deadline_ms() -> u64 {
    15_000
}

fn default_min_ratings() -> usize {
    50
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn thresholds(&self) -> FilterThresholds {
        FilterThresholds {
            min_item_ratings: self.min_item_ratings,
            min_user_ratings: self.min_user_ratings,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    pub fn enrichment_deadline(&self) -> Duration {
        Duration::from_millis(self.enrichment_deadline_ms)
    }
}
