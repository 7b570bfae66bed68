use std::fmt::Display;

use crate::{
    cache::ModelStore,
    error::AppResult,
    pipeline::{self, DatasetSource, FilterThresholds, SimilarityMatrix},
};

/// Where the serving model came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOrigin {
    /// Read back from the model store
    Loaded,
    /// Built from the dataset (cold start or unreadable cache)
    Rebuilt,
}

impl Display for ModelOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelOrigin::Loaded => write!(f, "loaded"),
            ModelOrigin::Rebuilt => write!(f, "rebuilt"),
        }
    }
}

/// A model ready to serve
#[derive(Debug)]
pub struct ReadyModel {
    pub matrix: SimilarityMatrix,
    pub origin: ModelOrigin,
}

/// Loads the cached model, rebuilding and storing it when the cache is
/// absent or unreadable.
///
/// An `Err` means the model could not be produced at all (dataset missing or
/// malformed) and the process should not start serving. A failed `store`
/// after a rebuild only costs a rebuild next time, so it is logged and ignored.
pub fn ensure_model(
    store: &dyn ModelStore,
    source: &dyn DatasetSource,
    thresholds: FilterThresholds,
) -> AppResult<ReadyModel> {
    match store.load() {
        Ok(Some(matrix)) => {
            return Ok(ReadyModel {
                matrix,
                origin: ModelOrigin::Loaded,
            })
        }
        Ok(None) => tracing::info!("Cold start, building similarity matrix"),
        Err(e) => tracing::warn!(error = %e, "Cached model unreadable, rebuilding"),
    }

    let matrix = rebuild_and_store(store, source, thresholds)?;

    Ok(ReadyModel {
        matrix,
        origin: ModelOrigin::Rebuilt,
    })
}

/// Builds the model from the dataset and hands it to the store
pub fn rebuild_and_store(
    store: &dyn ModelStore,
    source: &dyn DatasetSource,
    thresholds: FilterThresholds,
) -> AppResult<SimilarityMatrix> {
    let matrix = pipeline::rebuild(source, thresholds)?;

    if matrix.is_empty() {
        tracing::warn!("Similarity matrix is empty, every query will return 404");
    }

    if let Err(e) = store.store(&matrix) {
        tracing::warn!(error = %e, "Failed to store model, it will be rebuilt on next start");
    }

    Ok(matrix)
}
