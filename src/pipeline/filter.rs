use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{AnimeRecord, NamedRating, RatingRecord};

/// Popularity thresholds applied after the join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterThresholds {
    /// Minimum ratings an anime needs to stay in the matrix
    pub min_item_ratings: usize,
    /// Minimum ratings (on retained anime) a user needs to stay in the matrix
    pub min_user_ratings: usize,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_item_ratings: 50,
            min_user_ratings: 50,
        }
    }
}

/// Drops unrated rows and inner-joins the rest to anime names.
///
/// Ratings whose `anime_id` has no metadata row are dropped silently.
pub fn clean_and_join(ratings: &[RatingRecord], anime: &[AnimeRecord]) -> Vec<NamedRating> {
    let names: HashMap<u32, Arc<str>> = anime
        .iter()
        .map(|a| (a.anime_id, Arc::from(a.name.as_str())))
        .collect();

    let rated = ratings.iter().filter(|r| r.is_rated()).count();

    let joined: Vec<NamedRating> = ratings
        .iter()
        .filter(|r| r.is_rated())
        .filter_map(|r| {
            names.get(&r.anime_id).map(|name| NamedRating {
                user_id: r.user_id,
                name: Arc::clone(name),
                score: r.rating as f32,
            })
        })
        .collect();

    tracing::info!(
        raw_rows = ratings.len(),
        unrated_dropped = ratings.len() - rated,
        unmatched_dropped = rated - joined.len(),
        joined_rows = joined.len(),
        "Ratings cleaned and joined"
    );

    joined
}

/// Keeps only popular anime and active users.
///
/// Anime below `min_item_ratings` are removed first, then users below
/// `min_user_ratings` counted on the remaining anime. This is a single pass:
/// dropping users afterwards can leave an anime under its threshold again.
pub fn apply_thresholds(
    mut rows: Vec<NamedRating>,
    thresholds: FilterThresholds,
) -> Vec<NamedRating> {
    let joined = rows.len();

    let item_counts = count_by(&rows, |r| Arc::clone(&r.name));
    rows.retain(|r| item_counts[&r.name] >= thresholds.min_item_ratings);
    let popular = item_counts
        .values()
        .filter(|&&c| c >= thresholds.min_item_ratings)
        .count();
    let after_items = rows.len();

    let user_counts = count_by(&rows, |r| r.user_id);
    rows.retain(|r| user_counts[&r.user_id] >= thresholds.min_user_ratings);
    let active = user_counts
        .values()
        .filter(|&&c| c >= thresholds.min_user_ratings)
        .count();

    tracing::info!(
        joined_rows = joined,
        popular_anime = popular,
        total_anime = item_counts.len(),
        rows_after_item_filter = after_items,
        active_users = active,
        rows = rows.len(),
        min_item_ratings = thresholds.min_item_ratings,
        min_user_ratings = thresholds.min_user_ratings,
        "Popularity thresholds applied"
    );

    rows
}

/// Full Cleaner/Filter stage: sentinel removal, join, thresholds
pub fn filter_ratings(
    ratings: &[RatingRecord],
    anime: &[AnimeRecord],
    thresholds: FilterThresholds,
) -> Vec<NamedRating> {
    apply_thresholds(clean_and_join(ratings, anime), thresholds)
}

fn count_by<K, F>(rows: &[NamedRating], key: F) -> HashMap<K, usize>
where
    K: std::hash::Hash + Eq,
    F: Fn(&NamedRating) -> K,
{
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(key(row)).or_insert(0) += 1;
    }
    counts
}
