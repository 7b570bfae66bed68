use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{AnimeRecord, Dataset, RatingRecord},
};

/// Source of the raw ratings and anime tables
///
/// The rebuild path only needs "give me both tables"; where they come from
/// (CSV on disk, fixtures in tests) is up to the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> AppResult<Dataset>;
}

/// Reads the Kaggle anime-recommendations layout (`rating.csv`, `anime.csv`)
#[derive(Debug, Clone)]
pub struct CsvDataset {
    ratings_path: PathBuf,
    anime_path: PathBuf,
}

impl CsvDataset {
    pub fn new(ratings_path: impl Into<PathBuf>, anime_path: impl Into<PathBuf>) -> Self {
        Self {
            ratings_path: ratings_path.into(),
            anime_path: anime_path.into(),
        }
    }
}

impl DatasetSource for CsvDataset {
    fn load(&self) -> AppResult<Dataset> {
        let ratings = load_ratings(&self.ratings_path)?;
        let anime = load_anime(&self.anime_path)?;
        Ok(Dataset { ratings, anime })
    }
}

/// Loads `user_id, anime_id, rating` rows
pub fn load_ratings(path: &Path) -> AppResult<Vec<RatingRecord>> {
    let ratings: Vec<RatingRecord> = read_table(path)?;
    tracing::info!(path = %path.display(), rows = ratings.len(), "Ratings loaded");
    Ok(ratings)
}

/// Loads `anime_id, name, ...` rows; extra columns are ignored
pub fn load_anime(path: &Path) -> AppResult<Vec<AnimeRecord>> {
    let anime: Vec<AnimeRecord> = read_table(path)?;
    tracing::info!(path = %path.display(), rows = anime.len(), "Anime metadata loaded");
    Ok(anime)
}

fn read_table<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        AppError::Dataset(format!("Failed to open {}: {}", path.display(), e))
    })?;

    reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|e| {
                // +2: one for the header, one for 1-based lines
                AppError::Dataset(format!(
                    "{} line {}: {}",
                    path.display(),
                    index + 2,
                    e
                ))
            })
        })
        .collect()
}
