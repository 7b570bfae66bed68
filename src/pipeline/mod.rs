//! Offline model build: load → clean/filter → pivot → cosine similarity

use std::time::Instant;

use crate::{error::AppResult, models::Dataset};

pub mod filter;
pub mod loader;
pub mod matrix;
pub mod similarity;

pub use filter::{apply_thresholds, clean_and_join, filter_ratings, FilterThresholds};
pub use loader::{CsvDataset, DatasetSource};
pub use matrix::ItemUserMatrix;
pub use similarity::{cosine_similarity, SimilarityMatrix};

#[cfg(test)]
pub use loader::MockDatasetSource;

/// Runs the whole pipeline over an in-memory dataset
pub fn build_similarity_matrix(
    dataset: &Dataset,
    thresholds: FilterThresholds,
) -> AppResult<SimilarityMatrix> {
    let start = Instant::now();

    let rows = filter_ratings(&dataset.ratings, &dataset.anime, thresholds);
    let item_user = ItemUserMatrix::from_ratings(&rows);
    let similarity = cosine_similarity(item_user)?;

    tracing::info!(
        items = similarity.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Similarity matrix built"
    );

    Ok(similarity)
}

/// Loads the dataset from `source` and builds the matrix
pub fn rebuild(
    source: &dyn DatasetSource,
    thresholds: FilterThresholds,
) -> AppResult<SimilarityMatrix> {
    let dataset = source.load()?;
    build_similarity_matrix(&dataset, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimeRecord, RatingRecord};

    #[test]
    fn test_build_from_raw_tables() {
        let anime = vec![
            AnimeRecord {
                anime_id: 1,
                name: "Cowboy Bebop".to_string(),
            },
            AnimeRecord {
                anime_id: 2,
                name: "Trigun".to_string(),
            },
            AnimeRecord {
                anime_id: 3,
                name: "Obscure OVA".to_string(),
            },
        ];
        let mut ratings = Vec::new();
        for user in 0..4 {
            ratings.push(RatingRecord { user_id: user, anime_id: 1, rating: 9 });
            ratings.push(RatingRecord { user_id: user, anime_id: 2, rating: 8 });
            ratings.push(RatingRecord { user_id: user, anime_id: 2, rating: -1 });
        }
        ratings.push(RatingRecord { user_id: 0, anime_id: 3, rating: 10 });

        let dataset = Dataset { ratings, anime };
        let thresholds = FilterThresholds {
            min_item_ratings: 2,
            min_user_ratings: 2,
        };

        let sims = build_similarity_matrix(&dataset, thresholds).unwrap();

        assert_eq!(sims.labels(), &["Cowboy Bebop", "Trigun"]);
        let trigun = sims.index_of("Trigun").unwrap();
        assert!((sims.row("Cowboy Bebop").unwrap()[trigun] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rebuild_propagates_source_error() {
        let mut source = MockDatasetSource::new();
        source
            .expect_load()
            .returning(|| Err(crate::error::AppError::Dataset("missing".to_string())));

        let result = rebuild(&source, FilterThresholds::default());

        assert!(result.is_err());
    }
}
