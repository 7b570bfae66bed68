//! Poster image providers
//!
//! Image lookup is best-effort enrichment: a provider always answers with a
//! URL, falling back to a placeholder when the upstream service fails.

pub mod jikan;

pub use jikan::JikanProvider;

/// Trait for poster image providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Looks up a poster for `anime_name`; never fails
    async fn fetch_image(&self, anime_name: &str) -> String;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
