//! Client-side recipe planning core.
//!
//! The backend is a flat CRUD JSON API; everything interesting happens
//! client-side. This crate owns the derived-view layer — multi-facet
//! filtering, rating aggregation, trending/popular classification, ranking
//! and review indexing — plus the state container those views read from and
//! the typed API client that feeds it. The derivation functions are
//! synchronous and pure; asynchronous work is confined to [`api`].

pub mod api;
pub mod difficulty;
pub mod engagement;
pub mod error;
pub mod filter;
pub mod memo;
pub mod rating;
pub mod review_index;
pub mod session;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{JsonApiClient, MockApi, RecipeApi};
pub use difficulty::{classify, Difficulty};
pub use engagement::{
    is_popular, is_trending, popularity_score, rank_by_popularity, sort_recipes, SortKey,
};
pub use error::{ApiError, DeriveError};
pub use filter::{
    bookmarked_recipes, filter_recipes, unique_categories, unique_cuisines, FacetKey,
    FacetSelection, RecipeFilters, TimeBucket,
};
pub use memo::Memo;
pub use rating::{aggregate, RatingStats, MAX_RATING, MIN_RATING};
pub use review_index::ReviewIndex;
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use state::{
    AppState, AuthEvent, AuthState, RecipesEvent, RecipesState, ReviewsEvent, ReviewsState,
};
pub use types::{
    Credentials, NewRecipe, NewReview, Recipe, RecipePatch, Review, ReviewPatch, SpiceLevel, User,
};
