use crate::{error::AppResult, pipeline::SimilarityMatrix};

pub mod file_store;

pub use file_store::FileModelStore;

/// Persistence for the similarity matrix
///
/// `load` returns `Ok(None)` when nothing has been stored yet and `Err` when a
/// stored model exists but cannot be read; callers treat both as "rebuild".
#[cfg_attr(test, mockall::automock)]
pub trait ModelStore: Send + Sync {
    fn load(&self) -> AppResult<Option<SimilarityMatrix>>;

    fn store(&self, matrix: &SimilarityMatrix) -> AppResult<()>;
}
