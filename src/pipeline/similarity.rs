use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, Axis};

use crate::{
    error::{AppError, AppResult},
    pipeline::matrix::ItemUserMatrix,
};

/// Square item×item cosine similarity matrix labelled by anime name
///
/// Built once and then only read; the serving layer shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    values: Array2<f32>,
}

impl SimilarityMatrix {
    /// Wraps a labelled square matrix, validating its shape
    pub fn new(labels: Vec<String>, values: Array2<f32>) -> AppResult<Self> {
        let (rows, cols) = values.dim();
        if rows != cols || rows != labels.len() {
            return Err(AppError::Internal(format!(
                "Similarity matrix is {}x{} but has {} labels",
                rows,
                cols,
                labels.len()
            )));
        }

        let index: HashMap<String, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        if index.len() != labels.len() {
            return Err(AppError::Internal(
                "Similarity matrix labels are not unique".to_string(),
            ));
        }

        Ok(Self {
            labels,
            index,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Exact, case-sensitive label lookup
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Similarities of `name` against every label, in label order
    pub fn row(&self, name: &str) -> Option<ArrayView1<'_, f32>> {
        self.index_of(name).map(|i| self.values.row(i))
    }
}

/// Pairwise cosine similarity between the item rows of `matrix`
///
/// Consumes the pivot: rows are L2-normalised in place and multiplied in a single `N · Nᵀ` product. The
/// result is made exactly symmetric, clamped to [-1, 1] and given a diagonal
/// of exactly 1.0 (an all-zero row is treated as similar to itself only).
pub fn cosine_similarity(matrix: ItemUserMatrix) -> AppResult<SimilarityMatrix> {
    let (n_items, n_users) = (matrix.n_items(), matrix.n_users());
    let ItemUserMatrix {
        items, mut values, ..
    } = matrix;

    for mut row in values.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }

    let mut sims = values.dot(&values.t());

    for i in 0..n_items {
        sims[[i, i]] = 1.0;
        for j in (i + 1)..n_items {
            let value = sims[[i, j]].clamp(-1.0, 1.0);
            sims[[i, j]] = value;
            sims[[j, i]] = value;
        }
    }

    tracing::info!(
        items = n_items,
        users = n_users,
        "Cosine similarity computed"
    );

    SimilarityMatrix::new(items, sims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedRating;
    use ndarray::array;
    use std::sync::Arc;

    fn named(user_id: u32, name: &str, score: f32) -> NamedRating {
        NamedRating {
            user_id,
            name: Arc::from(name),
            score,
        }
    }

    fn similarity(sims: &SimilarityMatrix, a: &str, b: &str) -> f32 {
        let j = sims.index_of(b).unwrap();
        sims.row(a).unwrap()[j]
    }

    fn sample_matrix() -> SimilarityMatrix {
        let rows: Vec<NamedRating> = (0..8u32)
            .flat_map(|user| {
                (0..5u32).filter_map(move |item| {
                    let score = (user * 3 + item * 5) % 11;
                    (score > 0).then(|| named(user, &format!("anime-{}", item), score as f32))
                })
            })
            .collect();
        cosine_similarity(ItemUserMatrix::from_ratings(&rows)).unwrap()
    }

    #[test]
    fn test_two_item_scenario() {
        let rows = vec![
            named(1, "i1", 5.0),
            named(1, "i2", 5.0),
            named(2, "i1", 5.0),
            named(2, "i2", 1.0),
        ];

        let sims = cosine_similarity(ItemUserMatrix::from_ratings(&rows)).unwrap();

        // (25 + 5) / (sqrt(50) * sqrt(26))
        let expected = 30.0 / (50f32.sqrt() * 26f32.sqrt());
        let actual = similarity(&sims, "i1", "i2");
        assert!((actual - expected).abs() < 1e-5);
        assert!((actual - 0.832).abs() < 1e-3);
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let sims = sample_matrix();
        let values = sims.values();
        for i in 0..sims.len() {
            for j in 0..sims.len() {
                assert!((values[[i, j]] - values[[j, i]]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_diagonal_is_exactly_one() {
        let sims = sample_matrix();
        for i in 0..sims.len() {
            assert_eq!(sims.values()[[i, i]], 1.0);
        }
    }

    #[test]
    fn test_non_negative_inputs_give_unit_interval() {
        let sims = sample_matrix();
        assert!(sims.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_zero_row_is_orthogonal_to_everything_else() {
        let matrix = ItemUserMatrix {
            items: vec!["empty".to_string(), "full".to_string()],
            users: vec![1, 2],
            values: array![[0.0, 0.0], [3.0, 4.0]],
        };

        let sims = cosine_similarity(matrix).unwrap();

        assert_eq!(similarity(&sims, "empty", "empty"), 1.0);
        assert_eq!(similarity(&sims, "empty", "full"), 0.0);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let sims = sample_matrix();
        assert!(sims.index_of("anime-1").is_some());
        assert!(sims.index_of("Anime-1").is_none());
        assert!(sims.index_of("anime-1 ").is_none());
        assert!(sims.row("missing").is_none());
        assert_eq!(sims.row("anime-2").unwrap().len(), sims.len());
    }

    #[test]
    fn test_unnormalised_rows_are_scaled_before_the_product() {
        let matrix = ItemUserMatrix {
            items: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            users: vec![1, 2],
            values: array![[10.0, 0.0], [0.5, 0.0], [6.0, 8.0]],
        };

        let sims = cosine_similarity(matrix).unwrap();

        assert!((similarity(&sims, "a", "b") - 1.0).abs() < 1e-6);
        assert!((similarity(&sims, "a", "c") - 0.6).abs() < 1e-6);
        assert!((similarity(&sims, "c", "b") - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let result = SimilarityMatrix::new(vec!["a".to_string()], Array2::zeros((2, 2)));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_duplicate_labels() {
        let result = SimilarityMatrix::new(
            vec!["a".to_string(), "a".to_string()],
            Array2::eye(2),
        );
        assert!(result.is_err());
    }
}
