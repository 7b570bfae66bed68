use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    cache::ModelStore,
    error::{AppError, AppResult},
    pipeline::SimilarityMatrix,
};

/// Bumped whenever the on-disk layout changes; older blobs are rebuilt
const FORMAT_VERSION: u32 = 1;

/// On-disk layout of the cached model
#[derive(Serialize, Deserialize)]
struct StoredModel {
    format_version: u32,
    built_at: DateTime<Utc>,
    labels: Vec<String>,
    values: Array2<f32>,
}

/// Keeps the similarity matrix as a single bincode blob on local disk
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> AppResult<Option<SimilarityMatrix>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No cached model");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // From a slice, bogus length prefixes fail instead of allocating
        let stored: StoredModel = bincode::deserialize(&bytes)?;

        if stored.format_version != FORMAT_VERSION {
            return Err(AppError::Internal(format!(
                "Cached model has format version {}, expected {}",
                stored.format_version, FORMAT_VERSION
            )));
        }

        let matrix = SimilarityMatrix::new(stored.labels, stored.values)?;

        tracing::info!(
            path = %self.path.display(),
            items = matrix.len(),
            built_at = %stored.built_at,
            "Cached model loaded"
        );

        Ok(Some(matrix))
    }

    fn store(&self, matrix: &SimilarityMatrix) -> AppResult<()> {
        let stored = StoredModel {
            format_version: FORMAT_VERSION,
            built_at: Utc::now(),
            labels: matrix.labels().to_vec(),
            values: matrix.values().clone(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so readers never see a partial blob
        let temp_path = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            bincode::serialize_into(&mut writer, &stored)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            items = matrix.len(),
            "Model stored"
        );

        Ok(())
    }
}
