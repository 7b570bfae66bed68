use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rating value meaning "watched but not rated"
pub const UNRATED_SENTINEL: i32 = -1;

// ============================================================================
// Dataset Types
// ============================================================================

/// One row of `rating.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RatingRecord {
    pub user_id: u32,
    pub anime_id: u32,
    /// 1..=10, or [`UNRATED_SENTINEL`]
    pub rating: i32,
}

impl RatingRecord {
    pub fn is_rated(&self) -> bool {
        self.rating != UNRATED_SENTINEL
    }
}

/// One row of `anime.csv`; the remaining columns (genre, type, episodes,
/// rating, members) are not used by the recommender.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimeRecord {
    pub anime_id: u32,
    pub name: String,
}

/// Both tables of the source dataset, in memory
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub ratings: Vec<RatingRecord>,
    pub anime: Vec<AnimeRecord>,
}

/// A rating joined to its anime name. `anime_id` is gone after the join, so
/// two ids sharing a name end up in the same column.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRating {
    pub user_id: u32,
    pub name: Arc<str>,
    pub score: f32,
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// A single similar anime produced by the recommender
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub name: String,
    pub score: f32,
}

/// A recommendation enriched with a poster image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecommendation {
    pub name: String,
    pub similarity_score: f64,
    pub image_url: String,
}

impl EnrichedRecommendation {
    pub fn new(recommendation: Recommendation, image_url: String) -> Self {
        Self {
            name: recommendation.name,
            similarity_score: round_score(recommendation.score),
            image_url,
        }
    }
}

/// Body of a successful `GET /recommend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub input_anime: String,
    pub recommendations: Vec<EnrichedRecommendation>,
}

/// Rounds to 4 decimal places for display
fn round_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

// ============================================================================
// Jikan API Types
// ============================================================================

/// Response from GET /anime?q=...
#[derive(Debug, Clone, Deserialize)]
pub struct JikanSearchResponse {
    #[serde(default)]
    pub data: Vec<JikanAnime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanAnime {
    #[serde(default)]
    pub images: Option<JikanImages>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanImages {
    #[serde(default)]
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
}

impl JikanSearchResponse {
    /// JPG poster of the first result, if any
    pub fn first_image_url(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|anime| anime.images.as_ref())
            .and_then(|images| images.jpg.as_ref())
            .and_then(|jpg| jpg.image_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}
