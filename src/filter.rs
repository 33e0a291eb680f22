//! Multi-facet recipe filtering.
//!
//! The backend only supports flat CRUD queries, so all faceted filtering
//! happens client-side over the loaded collection. Facets are conjunctive:
//! a recipe must pass every active facet. Facet selections arriving from
//! the UI as `(key, value)` string pairs go through [`FacetSelection::parse`],
//! which rejects unknown keys and values instead of silently ignoring them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::engagement::{is_popular, is_trending};
use crate::error::DeriveError;
use crate::review_index::ReviewIndex;
use crate::types::{Recipe, SpiceLevel, User};

/// Total-time bucket for the cooking-time facet.
///
/// `Under30` is strict, `From30To60` includes both endpoints, `Over60` is
/// strict, so the buckets partition every total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBucket {
    #[serde(rename = "<30")]
    Under30,
    #[serde(rename = "30-60")]
    From30To60,
    #[serde(rename = ">60")]
    Over60,
}

impl TimeBucket {
    pub fn contains(&self, total_minutes: u32) -> bool {
        match self {
            TimeBucket::Under30 => total_minutes < 30,
            TimeBucket::From30To60 => (30..=60).contains(&total_minutes),
            TimeBucket::Over60 => total_minutes > 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Under30 => "<30",
            TimeBucket::From30To60 => "30-60",
            TimeBucket::Over60 => ">60",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "<30" => Some(TimeBucket::Under30),
            "30-60" => Some(TimeBucket::From30To60),
            ">60" => Some(TimeBucket::Over60),
            _ => None,
        }
    }
}

/// Active filter criteria. Held in UI state, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilters {
    pub search_query: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    /// A recipe must carry every tag listed here.
    pub dietary_tags: Vec<String>,
    /// A recipe must carry at least one of the meal types listed here.
    pub meal_type: Vec<String>,
    pub spice_level: Option<SpiceLevel>,
    pub difficulty: Option<Difficulty>,
    pub total_time: Option<TimeBucket>,
    pub trending_only: bool,
    pub popular_only: bool,
}

impl RecipeFilters {
    /// Whether any facet is active.
    pub fn is_active(&self) -> bool {
        self.search_query.as_deref().is_some_and(|q| !q.trim().is_empty())
            || self.category.is_some()
            || self.cuisine.is_some()
            || !self.dietary_tags.is_empty()
            || !self.meal_type.is_empty()
            || self.spice_level.is_some()
            || self.difficulty.is_some()
            || self.total_time.is_some()
            || self.trending_only
            || self.popular_only
    }

    /// Merge one parsed facet selection into the criteria.
    pub fn apply(&mut self, selection: FacetSelection) {
        match selection {
            FacetSelection::NoOp => {}
            FacetSelection::SearchQuery(q) => self.search_query = Some(q),
            FacetSelection::Category(c) => self.category = Some(c),
            FacetSelection::Cuisine(c) => self.cuisine = Some(c),
            FacetSelection::DietaryTag(tag) => {
                if !self.dietary_tags.contains(&tag) {
                    self.dietary_tags.push(tag);
                }
            }
            FacetSelection::MealType(meal) => {
                if !self.meal_type.contains(&meal) {
                    self.meal_type.push(meal);
                }
            }
            FacetSelection::SpiceLevel(level) => self.spice_level = Some(level),
            FacetSelection::Difficulty(difficulty) => self.difficulty = Some(difficulty),
            FacetSelection::TotalTime(bucket) => self.total_time = Some(bucket),
            FacetSelection::Trending => self.trending_only = true,
            FacetSelection::Popular => self.popular_only = true,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A filterable facet, keyed by the vocabulary the UI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKey {
    SearchQuery,
    Category,
    Cuisine,
    DietaryTags,
    MealType,
    SpiceLevel,
    Difficulty,
    TotalTime,
    IsTrending,
    IsPopular,
}

impl FacetKey {
    /// Parse a facet key. Unknown keys are a configuration error, not a
    /// silent no-op.
    pub fn parse(key: &str) -> Result<Self, DeriveError> {
        match key {
            "q" | "searchQuery" => Ok(FacetKey::SearchQuery),
            "category" => Ok(FacetKey::Category),
            "cuisine" => Ok(FacetKey::Cuisine),
            "dietaryTags" => Ok(FacetKey::DietaryTags),
            "mealType" => Ok(FacetKey::MealType),
            "spiceLevel" => Ok(FacetKey::SpiceLevel),
            "difficulty" => Ok(FacetKey::Difficulty),
            "totalTime" => Ok(FacetKey::TotalTime),
            "isTrending" => Ok(FacetKey::IsTrending),
            "isPopular" => Ok(FacetKey::IsPopular),
            other => Err(DeriveError::UnknownFacet(other.to_string())),
        }
    }
}

/// One parsed facet selection, ready to merge into [`RecipeFilters`].
#[derive(Debug, Clone, PartialEq)]
pub enum FacetSelection {
    /// The value `"all"` (or an empty value): leave the facet untouched.
    NoOp,
    SearchQuery(String),
    Category(String),
    Cuisine(String),
    DietaryTag(String),
    MealType(String),
    SpiceLevel(SpiceLevel),
    Difficulty(Difficulty),
    TotalTime(TimeBucket),
    Trending,
    Popular,
}

impl FacetSelection {
    /// Parse a `(key, value)` pair from the UI into a typed selection.
    ///
    /// Unknown keys and unparseable values fail fast with a typed error;
    /// the only no-op values are `"all"` and the empty string.
    pub fn parse(key: &str, value: &str) -> Result<Self, DeriveError> {
        let facet = FacetKey::parse(key)?;

        if value.is_empty() || value == "all" {
            return Ok(FacetSelection::NoOp);
        }

        let invalid = || DeriveError::UnknownFacetValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match facet {
            FacetKey::SearchQuery => Ok(FacetSelection::SearchQuery(value.to_string())),
            FacetKey::Category => Ok(FacetSelection::Category(value.to_string())),
            FacetKey::Cuisine => Ok(FacetSelection::Cuisine(value.to_string())),
            FacetKey::DietaryTags => Ok(FacetSelection::DietaryTag(value.to_string())),
            FacetKey::MealType => Ok(FacetSelection::MealType(value.to_string())),
            FacetKey::SpiceLevel => value
                .parse::<u8>()
                .ok()
                .and_then(|n| SpiceLevel::try_from(n).ok())
                .map(FacetSelection::SpiceLevel)
                .ok_or_else(invalid),
            FacetKey::Difficulty => Difficulty::from_str(value)
                .map(FacetSelection::Difficulty)
                .ok_or_else(invalid),
            FacetKey::TotalTime => TimeBucket::from_str(value)
                .map(FacetSelection::TotalTime)
                .ok_or_else(invalid),
            FacetKey::IsTrending => match value {
                "true" => Ok(FacetSelection::Trending),
                _ => Err(invalid()),
            },
            FacetKey::IsPopular => match value {
                "true" => Ok(FacetSelection::Popular),
                _ => Err(invalid()),
            },
        }
    }
}

/// Apply all active facets to a recipe collection.
///
/// Pure: never mutates its inputs, returns references into `recipes` in
/// input order. The trending/popular facets need review data; when
/// `reviews` is `None` they pass everything through, so results firm up
/// once reviews arrive. `now` is the evaluation time for the trending
/// window.
pub fn filter_recipes<'a>(
    recipes: &'a [Recipe],
    filters: &RecipeFilters,
    reviews: Option<&ReviewIndex>,
    now: DateTime<Utc>,
) -> Vec<&'a Recipe> {
    recipes
        .iter()
        .filter(|recipe| matches(recipe, filters, reviews, now))
        .collect()
}

fn matches(
    recipe: &Recipe,
    filters: &RecipeFilters,
    reviews: Option<&ReviewIndex>,
    now: DateTime<Utc>,
) -> bool {
    if let Some(query) = filters.search_query.as_deref() {
        let query = query.trim().to_lowercase();
        if !query.is_empty() && !text_matches(recipe, &query) {
            return false;
        }
    }

    if let Some(category) = filters.category.as_deref() {
        if recipe.category != category {
            return false;
        }
    }

    if let Some(cuisine) = filters.cuisine.as_deref() {
        let matched = recipe
            .cuisine
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(cuisine));
        if !matched {
            return false;
        }
    }

    // Dietary tags are AND: untagged recipes never match a non-empty filter.
    if !filters.dietary_tags.is_empty() {
        if recipe.dietary_tags.is_empty() {
            return false;
        }
        if !filters
            .dietary_tags
            .iter()
            .all(|tag| recipe.dietary_tags.contains(tag))
        {
            return false;
        }
    }

    // Meal types are OR within the facet.
    if !filters.meal_type.is_empty()
        && !filters
            .meal_type
            .iter()
            .any(|meal| recipe.meal_type.contains(meal))
    {
        return false;
    }

    if let Some(level) = filters.spice_level {
        if recipe.spice_level != Some(level) {
            return false;
        }
    }

    if let Some(difficulty) = filters.difficulty {
        if Difficulty::of(recipe) != difficulty {
            return false;
        }
    }

    if let Some(bucket) = filters.total_time {
        if !bucket.contains(recipe.total_time()) {
            return false;
        }
    }

    // Without review data these two facets pass everything through.
    if let Some(index) = reviews {
        if filters.trending_only && !is_trending(recipe, index, now) {
            return false;
        }
        if filters.popular_only && !is_popular(recipe, index) {
            return false;
        }
    }

    true
}

fn text_matches(recipe: &Recipe, query: &str) -> bool {
    recipe.title.to_lowercase().contains(query)
        || recipe.description.to_lowercase().contains(query)
        || recipe.category.to_lowercase().contains(query)
        || recipe
            .ingredients
            .iter()
            .any(|ingredient| ingredient.to_lowercase().contains(query))
}

/// Recipes bookmarked by a user, in collection order.
pub fn bookmarked_recipes<'a>(recipes: &'a [Recipe], user: &User) -> Vec<&'a Recipe> {
    if user.bookmarks.is_empty() {
        return vec![];
    }
    recipes
        .iter()
        .filter(|recipe| user.bookmarks.contains(&recipe.id))
        .collect()
}

/// Distinct categories across the collection, sorted.
pub fn unique_categories(recipes: &[Recipe]) -> Vec<String> {
    let mut categories: Vec<String> = recipes.iter().map(|r| r.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Distinct cuisines across the collection, sorted. Recipes without a
/// cuisine are skipped.
pub fn unique_cuisines(recipes: &[Recipe]) -> Vec<String> {
    let mut cuisines: Vec<String> = recipes
        .iter()
        .filter_map(|r| r.cuisine.clone())
        .collect();
    cuisines.sort();
    cuisines.dedup();
    cuisines
}
