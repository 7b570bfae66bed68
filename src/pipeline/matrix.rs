use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ndarray::Array2;

use crate::models::NamedRating;

/// Dense item×user rating matrix
///
/// Rows are anime sorted by name, columns are users sorted by id. A cell holds
/// the user's rating or 0.0 when the user did not rate the anime; ratings are
/// 1..=10, so 0.0 never collides with a real score.
#[derive(Debug, Clone)]
pub struct ItemUserMatrix {
    pub items: Vec<String>,
    pub users: Vec<u32>,
    pub values: Array2<f32>,
}

impl ItemUserMatrix {
    /// Pivots filtered rows. A repeated (user, anime) pair keeps its last score.
    pub fn from_ratings(rows: &[NamedRating]) -> Self {
        let items: BTreeSet<&Arc<str>> = rows.iter().map(|r| &r.name).collect();
        let users: BTreeSet<u32> = rows.iter().map(|r| r.user_id).collect();

        let item_index: HashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(i, name)| (&***name, i))
            .collect();
        let user_index: HashMap<u32, usize> =
            users.iter().enumerate().map(|(i, &u)| (u, i)).collect();

        let mut values = Array2::<f32>::zeros((items.len(), users.len()));
        for row in rows {
            let i = item_index[&*row.name];
            let u = user_index[&row.user_id];
            values[[i, u]] = row.score;
        }

        tracing::info!(
            items = items.len(),
            users = users.len(),
            filled = rows.len(),
            "Item-user matrix built"
        );

        Self {
            items: items.into_iter().map(|name| name.to_string()).collect(),
            users: users.into_iter().collect(),
            values,
        }
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }
}
