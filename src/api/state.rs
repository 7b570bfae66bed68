use std::sync::Arc;

use crate::{pipeline::SimilarityMatrix, services::Enricher};

/// Shared, read-only application state
///
/// Built once at startup; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<SimilarityMatrix>,
    pub enricher: Arc<Enricher>,
    pub top_n: usize,
}

impl AppState {
    pub fn new(model: SimilarityMatrix, enricher: Enricher, top_n: usize) -> Self {
        Self {
            model: Arc::new(model),
            enricher: Arc::new(enricher),
            top_n,
        }
    }
}
