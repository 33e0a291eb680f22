//! Popularity and trending classification, and recipe ranking.
//!
//! All functions here take review data and (where relevant) an explicit
//! evaluation time, so they stay pure and testable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::review_index::ReviewIndex;
use crate::types::Recipe;

/// Minimum review count for a recipe to be popular.
pub const POPULAR_MIN_REVIEWS: usize = 3;
/// Minimum average rating for a recipe to be popular.
pub const POPULAR_MIN_AVERAGE: f32 = 4.0;
/// How far back the trending window reaches, in days.
pub const TRENDING_WINDOW_DAYS: i64 = 7;
/// Minimum review count for a recipe to be trending.
pub const TRENDING_MIN_REVIEWS: usize = 2;

/// Whether a recipe is popular: 3+ reviews averaging 4.0 or better.
///
/// Requires the recipe's reviews to be loaded; unloaded reviews mean
/// "unknown", reported as `false`. This never triggers a fetch.
pub fn is_popular(recipe: &Recipe, reviews: &ReviewIndex) -> bool {
    if !reviews.is_loaded(&recipe.id) {
        return false;
    }
    let count = reviews.reviews_for(&recipe.id).len();
    let average = reviews
        .stats_for(&recipe.id)
        .map(|stats| stats.average)
        .unwrap_or(0.0);
    count >= POPULAR_MIN_REVIEWS && average >= POPULAR_MIN_AVERAGE
}

/// Whether a recipe is trending: created within the last 7 days (relative
/// to `now`) with 2+ reviews.
pub fn is_trending(recipe: &Recipe, reviews: &ReviewIndex, now: DateTime<Utc>) -> bool {
    let window_start = now - Duration::days(TRENDING_WINDOW_DAYS);
    recipe.created_at >= window_start
        && reviews.reviews_for(&recipe.id).len() >= TRENDING_MIN_REVIEWS
}

/// Popularity score: review count x average rating. Used for ranking only,
/// never displayed.
pub fn popularity_score(recipe: &Recipe, reviews: &ReviewIndex) -> f32 {
    let count = reviews.reviews_for(&recipe.id).len() as f32;
    let average = reviews
        .stats_for(&recipe.id)
        .map(|stats| stats.average)
        .unwrap_or(0.0);
    count * average
}

/// Rank recipes by popularity score, highest first. The sort is stable:
/// recipes with equal scores keep their input order.
pub fn rank_by_popularity<'a>(recipes: &'a [Recipe], reviews: &ReviewIndex) -> Vec<&'a Recipe> {
    let mut ranked: Vec<&Recipe> = recipes.iter().collect();
    ranked.sort_by(|a, b| {
        popularity_score(b, reviews).total_cmp(&popularity_score(a, reviews))
    });
    ranked
}

/// Sort menu options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Popularity score, highest first.
    Popular,
    /// Average rating, highest first.
    Rating,
    /// Total time, quickest first.
    Time,
    /// Creation time, newest first.
    Newest,
    /// Title, A-Z.
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Popular => "popular",
            SortKey::Rating => "rating",
            SortKey::Time => "time",
            SortKey::Newest => "newest",
            SortKey::Name => "name",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "popular" => Some(SortKey::Popular),
            "rating" => Some(SortKey::Rating),
            "time" => Some(SortKey::Time),
            "newest" => Some(SortKey::Newest),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }
}

/// Sort recipes by the given key. All sorts are stable.
pub fn sort_recipes<'a>(
    recipes: &'a [Recipe],
    key: SortKey,
    reviews: &ReviewIndex,
) -> Vec<&'a Recipe> {
    match key {
        SortKey::Popular => rank_by_popularity(recipes, reviews),
        SortKey::Rating => {
            let mut sorted: Vec<&Recipe> = recipes.iter().collect();
            sorted.sort_by(|a, b| {
                let a_avg = reviews.stats_or_default(&a.id).average;
                let b_avg = reviews.stats_or_default(&b.id).average;
                b_avg.total_cmp(&a_avg)
            });
            sorted
        }
        SortKey::Time => {
            let mut sorted: Vec<&Recipe> = recipes.iter().collect();
            sorted.sort_by_key(|r| r.total_time());
            sorted
        }
        SortKey::Newest => {
            let mut sorted: Vec<&Recipe> = recipes.iter().collect();
            sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            sorted
        }
        SortKey::Name => {
            let mut sorted: Vec<&Recipe> = recipes.iter().collect();
            sorted.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
            sorted
        }
    }
}
