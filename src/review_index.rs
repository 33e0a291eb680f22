//! In-memory review indices.
//!
//! Reviews are indexed three ways (by recipe, by author, by id) plus a set
//! of recipe ids whose review lists are fully loaded, used to avoid
//! redundant re-fetching. Every mutation validates its input first and then
//! updates all indices and the per-recipe rating stats in one call, so
//! callers never observe a half-updated index. Within each list, insertion
//! order is preserved.

use std::collections::{HashMap, HashSet};

use crate::error::DeriveError;
use crate::rating::{aggregate, aggregate_unchecked, validate_rating, RatingStats};
use crate::types::Review;

#[derive(Debug, Clone, Default)]
pub struct ReviewIndex {
    by_recipe: HashMap<String, Vec<Review>>,
    by_author: HashMap<String, Vec<Review>>,
    by_id: HashMap<String, Review>,
    loaded_recipes: HashSet<String>,
    stats_by_recipe: HashMap<String, RatingStats>,
    /// Bumped on every mutation; cheap change detection for memoized
    /// selectors.
    revision: u64,
}

impl ReviewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been loaded into the index yet.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.loaded_recipes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of distinct reviews across all recipes.
    pub fn total_count(&self) -> usize {
        self.by_id.len()
    }

    /// Reviews for a recipe, in insertion order. Empty for unknown recipes.
    pub fn reviews_for(&self, recipe_id: &str) -> &[Review] {
        self.by_recipe
            .get(recipe_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reviews written by an author, in insertion order.
    pub fn reviews_by_author(&self, author_id: &str) -> &[Review] {
        self.by_author
            .get(author_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, review_id: &str) -> Option<&Review> {
        self.by_id.get(review_id)
    }

    /// Rating stats for a recipe, if any of its reviews are indexed.
    pub fn stats_for(&self, recipe_id: &str) -> Option<&RatingStats> {
        self.stats_by_recipe.get(recipe_id)
    }

    /// Rating stats for a recipe, or the zero stats for unknown recipes.
    pub fn stats_or_default(&self, recipe_id: &str) -> RatingStats {
        self.stats_by_recipe
            .get(recipe_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the full review list for a recipe has been loaded.
    pub fn is_loaded(&self, recipe_id: &str) -> bool {
        self.loaded_recipes.contains(recipe_id)
    }

    pub fn all_reviews(&self) -> impl Iterator<Item = &Review> {
        self.by_id.values()
    }

    /// Most recent reviews across all recipes, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Review> {
        let mut reviews: Vec<&Review> = self.by_id.values().collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        reviews.truncate(limit);
        reviews
    }

    /// Highest-rated reviews for a recipe, stable within equal ratings.
    pub fn top_rated_for(&self, recipe_id: &str, limit: usize) -> Vec<&Review> {
        let mut reviews: Vec<&Review> = self.reviews_for(recipe_id).iter().collect();
        reviews.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        reviews.truncate(limit);
        reviews
    }

    /// The review an author left on a recipe, if any.
    pub fn author_review_for(&self, recipe_id: &str, author_id: &str) -> Option<&Review> {
        self.reviews_for(recipe_id)
            .iter()
            .find(|r| r.author_id == author_id)
    }

    pub fn has_author_review(&self, recipe_id: &str, author_id: &str) -> bool {
        self.author_review_for(recipe_id, author_id).is_some()
    }

    /// Replace the review list for a recipe with a freshly fetched one and
    /// mark it fully loaded.
    pub fn set_recipe_reviews(
        &mut self,
        recipe_id: &str,
        reviews: Vec<Review>,
    ) -> Result<(), DeriveError> {
        let stats = aggregate(&reviews)?;

        if let Some(old) = self.by_recipe.remove(recipe_id) {
            for review in old {
                self.by_id.remove(&review.id);
                self.remove_from_author(&review);
            }
        }

        for review in &reviews {
            if let Some(stale) = self.by_id.remove(&review.id) {
                if stale.recipe_id != recipe_id {
                    if let Some(list) = self.by_recipe.get_mut(&stale.recipe_id) {
                        list.retain(|r| r.id != stale.id);
                    }
                    self.recompute_stats(&stale.recipe_id);
                }
                self.remove_from_author(&stale);
            }
            self.by_id.insert(review.id.clone(), review.clone());
            self.append_to_author(review);
        }

        self.by_recipe.insert(recipe_id.to_string(), reviews);
        self.loaded_recipes.insert(recipe_id.to_string());
        self.stats_by_recipe.insert(recipe_id.to_string(), stats);
        self.revision += 1;
        Ok(())
    }

    /// Merge a freshly fetched author review list into the index. Unlike
    /// recipe lists there is no completeness marker for authors, so this
    /// upserts rather than replaces.
    pub fn set_author_reviews(
        &mut self,
        author_id: &str,
        reviews: Vec<Review>,
    ) -> Result<(), DeriveError> {
        debug_assert!(reviews.iter().all(|r| r.author_id == author_id));
        for review in &reviews {
            validate_rating(review)?;
        }
        for review in reviews {
            self.upsert_unchecked(review);
        }
        self.revision += 1;
        Ok(())
    }

    /// Insert or update a single review in all indices.
    pub fn upsert(&mut self, review: Review) -> Result<(), DeriveError> {
        validate_rating(&review)?;
        self.upsert_unchecked(review);
        self.revision += 1;
        Ok(())
    }

    /// Remove a review from all indices. Unknown ids are a no-op.
    pub fn remove(&mut self, review_id: &str) -> Option<Review> {
        let old = self.by_id.remove(review_id)?;

        if let Some(list) = self.by_recipe.get_mut(&old.recipe_id) {
            list.retain(|r| r.id != review_id);
        }
        self.remove_from_author(&old);
        self.recompute_stats(&old.recipe_id);
        self.revision += 1;
        Some(old)
    }

    /// Drop everything loaded for one recipe, including its loaded marker.
    pub fn clear_recipe(&mut self, recipe_id: &str) {
        if let Some(old) = self.by_recipe.remove(recipe_id) {
            for review in old {
                self.by_id.remove(&review.id);
                self.remove_from_author(&review);
            }
        }
        self.loaded_recipes.remove(recipe_id);
        self.stats_by_recipe.remove(recipe_id);
        self.revision += 1;
    }

    /// Reset the index to its initial state.
    pub fn clear(&mut self) {
        let revision = self.revision + 1;
        *self = Self {
            revision,
            ..Self::default()
        };
    }

    fn upsert_unchecked(&mut self, review: Review) {
        if let Some(old) = self.by_id.remove(&review.id) {
            // A moved review (different recipe or author) must leave its
            // old lists entirely.
            if old.recipe_id != review.recipe_id {
                if let Some(list) = self.by_recipe.get_mut(&old.recipe_id) {
                    list.retain(|r| r.id != old.id);
                }
                self.recompute_stats(&old.recipe_id);
            }
            if old.author_id != review.author_id {
                self.remove_from_author(&old);
            }
        }

        let recipe_list = self.by_recipe.entry(review.recipe_id.clone()).or_default();
        match recipe_list.iter_mut().find(|r| r.id == review.id) {
            Some(slot) => *slot = review.clone(),
            None => recipe_list.push(review.clone()),
        }

        self.append_to_author(&review);

        let recipe_id = review.recipe_id.clone();
        self.by_id.insert(review.id.clone(), review);
        self.recompute_stats(&recipe_id);
    }

    /// Insert or replace a review in its author's list, preserving
    /// insertion order.
    fn append_to_author(&mut self, review: &Review) {
        let list = self.by_author.entry(review.author_id.clone()).or_default();
        match list.iter_mut().find(|r| r.id == review.id) {
            Some(slot) => *slot = review.clone(),
            None => list.push(review.clone()),
        }
    }

    fn remove_from_author(&mut self, review: &Review) {
        if let Some(list) = self.by_author.get_mut(&review.author_id) {
            list.retain(|r| r.id != review.id);
            if list.is_empty() {
                self.by_author.remove(&review.author_id);
            }
        }
    }

    fn recompute_stats(&mut self, recipe_id: &str) {
        match self.by_recipe.get(recipe_id) {
            Some(reviews) if !reviews.is_empty() => {
                let stats = aggregate_unchecked(reviews);
                self.stats_by_recipe.insert(recipe_id.to_string(), stats);
            }
            Some(_) => {
                self.stats_by_recipe
                    .insert(recipe_id.to_string(), RatingStats::default());
            }
            None => {
                self.stats_by_recipe.remove(recipe_id);
            }
        }
    }
}
