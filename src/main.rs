use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anime_recommender::{
    api::{create_app, AppState},
    cache::FileModelStore,
    config::Config,
    pipeline::CsvDataset,
    services::{ensure_model, Enricher, JikanProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Reload the cached model or build it from the dataset
    let store = FileModelStore::new(config.model_path.clone());
    let source = CsvDataset::new(config.ratings_path.clone(), config.anime_path.clone());
    let thresholds = config.thresholds();
    let ready = tokio::task::spawn_blocking(move || ensure_model(&store, &source, thresholds))
        .await
        .context("model initialization task panicked")?
        .context("could not load or build the similarity matrix")?;

    tracing::info!(
        origin = %ready.origin,
        items = ready.matrix.len(),
        "Model ready"
    );

    let provider = Arc::new(JikanProvider::from_config(&config)?);
    let enricher = Enricher::from_config(provider, &config);
    let state = AppState::new(ready.matrix, enricher, config.top_n);

    let app = create_app(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(addr = %config.bind_addr(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
