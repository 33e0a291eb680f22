//! Fetch layer for the mock JSON backend.
//!
//! All asynchronous work lives here. The helpers in this module run one
//! fetch and apply its outcome to the state container as a single event, so
//! the derivation layer only ever sees whole results. Network failures are
//! recorded in state as displayable messages; they are never raised past
//! this boundary.

mod client;
mod mock;

pub use client::{JsonApiClient, RecipeApi, DEFAULT_BASE_URL};
pub use mock::MockApi;

use crate::error::DeriveError;
use crate::session::TokenStore;
use crate::state::{AppState, AuthEvent, RecipesEvent, ReviewsEvent};
use crate::types::{Credentials, NewReview};

/// Fetch the full recipe collection into state.
pub async fn load_recipes(api: &dyn RecipeApi, state: &mut AppState) {
    state.recipes.apply(RecipesEvent::LoadStarted);
    match api.list_recipes().await {
        Ok(recipes) => state.recipes.apply(RecipesEvent::Loaded(recipes)),
        Err(e) => state.recipes.apply(RecipesEvent::LoadFailed(e.user_message())),
    }
}

/// Fetch a single recipe and select it.
pub async fn load_recipe(api: &dyn RecipeApi, state: &mut AppState, id: &str) {
    state.recipes.apply(RecipesEvent::LoadStarted);
    match api.get_recipe(id).await {
        Ok(recipe) => state.recipes.apply(RecipesEvent::FetchedOne(recipe)),
        Err(e) => state.recipes.apply(RecipesEvent::LoadFailed(e.user_message())),
    }
}

/// Fetch the reviews for a recipe, unless they are already fully loaded.
pub async fn load_reviews_for_recipe(
    api: &dyn RecipeApi,
    state: &mut AppState,
    recipe_id: &str,
) -> Result<(), DeriveError> {
    if state.reviews.index().is_loaded(recipe_id) {
        return Ok(());
    }
    state.reviews.apply(ReviewsEvent::LoadStarted)?;
    match api.reviews_for_recipe(recipe_id).await {
        Ok(reviews) => state.reviews.apply(ReviewsEvent::RecipeReviewsLoaded {
            recipe_id: recipe_id.to_string(),
            reviews,
        }),
        Err(e) => state.reviews.apply(ReviewsEvent::LoadFailed(e.user_message())),
    }
}

/// Fetch all reviews written by an author and merge them into the index.
pub async fn load_reviews_for_author(
    api: &dyn RecipeApi,
    state: &mut AppState,
    author_id: &str,
) -> Result<(), DeriveError> {
    state.reviews.apply(ReviewsEvent::LoadStarted)?;
    match api.reviews_by_author(author_id).await {
        Ok(reviews) => state.reviews.apply(ReviewsEvent::AuthorReviewsLoaded {
            author_id: author_id.to_string(),
            reviews,
        }),
        Err(e) => state.reviews.apply(ReviewsEvent::LoadFailed(e.user_message())),
    }
}

/// Create a review and fold the created record into the index.
pub async fn submit_review(
    api: &dyn RecipeApi,
    state: &mut AppState,
    review: &NewReview,
) -> Result<(), DeriveError> {
    state.reviews.apply(ReviewsEvent::LoadStarted)?;
    match api.create_review(review).await {
        Ok(created) => state.reviews.apply(ReviewsEvent::Created(created)),
        Err(e) => state.reviews.apply(ReviewsEvent::LoadFailed(e.user_message())),
    }
}

/// Register a new account, persist its session token, and sign in.
pub async fn register_user(
    api: &dyn RecipeApi,
    state: &mut AppState,
    store: &mut dyn TokenStore,
    credentials: &Credentials,
) -> std::io::Result<()> {
    state.auth.apply(AuthEvent::LoginStarted);
    match api.register(credentials).await {
        Ok(user) => {
            // The mock backend issues no tokens; the session token is an
            // opaque marker derived from the account.
            let token = format!("session-{}", user.id);
            store.set(&token)?;
            state.auth.apply(AuthEvent::LoggedIn { user, token });
        }
        Err(e) => state.auth.apply(AuthEvent::LoginFailed(e.user_message())),
    }
    Ok(())
}

/// Clear the stored session token and sign out.
pub fn logout(state: &mut AppState, store: &mut dyn TokenStore) -> std::io::Result<()> {
    store.remove()?;
    state.auth.apply(AuthEvent::LoggedOut);
    Ok(())
}
