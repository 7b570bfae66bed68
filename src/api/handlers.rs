use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::RecommendationResponse,
    services::recommendations,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub anime: Option<String>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "items": state.model.len(),
    }))
}

/// Top-N similar anime for `?anime=<exact name>`, with poster images
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    // e.g. a repeated `anime` key
    let Query(params) = query.map_err(|rejection| {
        AppError::InvalidInput(format!(
            "Invalid query string, expected a single '?anime=<name>': {}",
            rejection.body_text()
        ))
    })?;

    let anime_name = params
        .anime
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput(
                "You must specify an anime name using '?anime=<name>'".to_string(),
            )
        })?;

    tracing::info!(
        request_id = %request_id,
        anime = %anime_name,
        "Processing recommendation request"
    );

    let recommendations = recommendations::recommend(&anime_name, &state.model, state.top_n)
        .inspect_err(|_| {
            tracing::info!(request_id = %request_id, anime = %anime_name, "Anime not in model");
        })?;

    let enriched = state.enricher.enrich(recommendations).await;

    tracing::info!(
        request_id = %request_id,
        results = enriched.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        input_anime: anime_name,
        recommendations: enriched,
    }))
}
