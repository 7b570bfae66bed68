use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    config::Config,
    models::{EnrichedRecommendation, Recommendation},
    services::providers::ImageProvider,
};

/// Attaches poster images to recommendations
///
/// Lookups run concurrently, at most `max_concurrency` at a time, under one
/// overall deadline. Whatever has not finished by the deadline is aborted and
/// gets the placeholder image, so a slow upstream delays a response by at most
/// the deadline.
pub struct Enricher {
    provider: Arc<dyn ImageProvider>,
    max_concurrency: usize,
    deadline: Duration,
    placeholder_url: String,
}

impl Enricher {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        max_concurrency: usize,
        deadline: Duration,
        placeholder_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            max_concurrency: max_concurrency.max(1),
            deadline,
            placeholder_url: placeholder_url.into(),
        }
    }

    pub fn from_config(provider: Arc<dyn ImageProvider>, config: &Config) -> Self {
        Self::new(
            provider,
            config.enrichment_concurrency,
            config.enrichment_deadline(),
            config.placeholder_image_url.clone(),
        )
    }

    /// Enriches every recommendation, keeping the input order
    pub async fn enrich(&self, recommendations: Vec<Recommendation>) -> Vec<EnrichedRecommendation> {
        if recommendations.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let limit = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (position, recommendation) in recommendations.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let limit = Arc::clone(&limit);
            let name = recommendation.name.clone();
            tasks.spawn(async move {
                let _permit = limit.acquire_owned().await.ok();
                (position, provider.fetch_image(&name).await)
            });
        }

        let mut images: Vec<Option<String>> = vec![None; recommendations.len()];
        let deadline = tokio::time::Instant::now() + self.deadline;

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((position, url)))) => images[position] = Some(url),
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "Image lookup task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        pending = tasks.len(),
                        deadline_ms = self.deadline.as_millis() as u64,
                        "Enrichment deadline reached, using placeholders"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        let missing = images.iter().filter(|i| i.is_none()).count();
        tracing::info!(
            provider = self.provider.name(),
            count = recommendations.len(),
            missing,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations enriched"
        );

        recommendations
            .into_iter()
            .zip(images)
            .map(|(recommendation, image)| {
                let url = image.unwrap_or_else(|| self.placeholder_url.clone());
                EnrichedRecommendation::new(recommendation, url)
            })
            .collect()
    }
}
