//! Rebuilds the similarity matrix from the dataset and replaces the cached
//! model, whether or not one exists.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anime_recommender::{
    cache::{FileModelStore, ModelStore},
    config::Config,
    pipeline::{self, CsvDataset},
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let source = CsvDataset::new(config.ratings_path.clone(), config.anime_path.clone());
    let matrix = pipeline::rebuild(&source, config.thresholds())
        .context("failed to build the similarity matrix")?;

    let store = FileModelStore::new(config.model_path.clone());
    store
        .store(&matrix)
        .with_context(|| format!("failed to write {}", store.path().display()))?;

    tracing::info!(
        items = matrix.len(),
        path = %store.path().display(),
        "Model built"
    );

    Ok(())
}
