use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
    pipeline::SimilarityMatrix,
};

/// Default number of recommendations per query
pub const DEFAULT_TOP_N: usize = 10;

/// Returns the `top_n` anime most similar to `anime_name`
///
/// Lookup is an exact, case-sensitive match on the label. Results are sorted
/// by score descending, ties broken by name ascending, and never include the
/// queried anime itself.
pub fn recommend(
    anime_name: &str,
    matrix: &SimilarityMatrix,
    top_n: usize,
) -> AppResult<Vec<Recommendation>> {
    let scores = matrix.row(anime_name).ok_or_else(|| {
        AppError::NotFound(format!(
            "Anime '{}' is not in the popular anime database",
            anime_name
        ))
    })?;

    let mut candidates: Vec<(&str, f32)> = matrix
        .labels()
        .iter()
        .zip(scores.iter())
        .filter(|(name, _)| name.as_str() != anime_name)
        .map(|(name, &score)| (name.as_str(), score))
        .collect();

    candidates.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });

    Ok(candidates
        .into_iter()
        .take(top_n)
        .map(|(name, score)| Recommendation {
            name: name.to_string(),
            score,
        })
        .collect())
}
