//! Jikan (unofficial MyAnimeList API) poster provider
//!
//! Searches `/anime?q=<name>` and takes the JPG poster of the first hit.
//! Jikan rate-limits aggressively; a 429 is answered with a fixed sleep and a
//! retry until the attempt budget runs out. Every other failure goes straight
//! to the placeholder.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::JikanSearchResponse,
    services::providers::ImageProvider,
};

/// Result of a single search call
#[derive(Debug, PartialEq)]
enum SearchOutcome {
    Found(String),
    NoResults,
    RateLimited,
}

#[derive(Clone)]
pub struct JikanProvider {
    http_client: HttpClient,
    api_url: String,
    placeholder_url: String,
    backoff: Duration,
    max_attempts: u32,
}

impl JikanProvider {
    pub fn new(
        api_url: impl Into<String>,
        placeholder_url: impl Into<String>,
        timeout: Duration,
        backoff: Duration,
        max_attempts: u32,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            placeholder_url: placeholder_url.into(),
            backoff,
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.jikan_api_url.clone(),
            config.placeholder_image_url.clone(),
            config.http_timeout(),
            config.rate_limit_backoff(),
            config.max_fetch_attempts,
        )
    }

    /// One call to the search endpoint
    async fn search(&self, anime_name: &str) -> AppResult<SearchOutcome> {
        let url = format!("{}/anime", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", anime_name), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchOutcome::RateLimited);
        }
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!(
                "Jikan API returned status {}",
                status
            )));
        }

        let body: JikanSearchResponse = response.json().await?;

        Ok(match body.first_image_url() {
            Some(url) => SearchOutcome::Found(url.to_string()),
            None => SearchOutcome::NoResults,
        })
    }
}

#[async_trait::async_trait]
impl ImageProvider for JikanProvider {
    async fn fetch_image(&self, anime_name: &str) -> String {
        for attempt in 1..=self.max_attempts {
            match self.search(anime_name).await {
                Ok(SearchOutcome::Found(url)) => {
                    tracing::debug!(anime = %anime_name, attempt, "Poster found");
                    return url;
                }
                Ok(SearchOutcome::NoResults) => {
                    tracing::debug!(anime = %anime_name, "No Jikan results");
                    break;
                }
                Ok(SearchOutcome::RateLimited) => {
                    tracing::warn!(
                        anime = %anime_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = self.backoff.as_millis() as u64,
                        "Jikan rate limit hit, backing off"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    tracing::warn!(anime = %anime_name, error = %e, "Poster lookup failed");
                    break;
                }
            }
        }

        self.placeholder_url.clone()
    }

    fn name(&self) -> &'static str {
        "jikan"
    }
}
