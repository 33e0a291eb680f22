//! In-memory API implementation for tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ApiError;
use crate::types::{
    Credentials, NewRecipe, NewReview, Recipe, RecipePatch, Review, ReviewPatch, User,
};

use super::RecipeApi;

/// Mock backend holding its collections in memory. Seed it with the
/// builder methods, or point it at nothing and drive it through the trait.
#[derive(Debug, Default)]
pub struct MockApi {
    data: Mutex<MockData>,
}

#[derive(Debug, Default)]
struct MockData {
    recipes: Vec<Recipe>,
    reviews: Vec<Review>,
    users: Vec<User>,
    next_id: u64,
    failure: Option<String>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipes(self, recipes: Vec<Recipe>) -> Self {
        self.lock().recipes = recipes;
        self
    }

    pub fn with_reviews(self, reviews: Vec<Review>) -> Self {
        self.lock().reviews = reviews;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.lock().users = users;
        self
    }

    /// Make every call fail with a 500 and the given message.
    pub fn with_failure(self, message: &str) -> Self {
        self.lock().failure = Some(message.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MockData {
    fn check(&self) -> Result<(), ApiError> {
        match &self.failure {
            Some(message) => Err(ApiError::Status {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

fn not_found(resource: &str, id: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{} {} not found", resource, id),
    }
}

#[async_trait]
impl RecipeApi for MockApi {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let data = self.lock();
        data.check()?;
        Ok(data.recipes.clone())
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, ApiError> {
        let data = self.lock();
        data.check()?;
        data.recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("recipe", id))
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError> {
        let mut data = self.lock();
        data.check()?;
        let now = Utc::now();
        let created = Recipe {
            id: data.next_id(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            category: recipe.category.clone(),
            image_url: recipe.image_url.clone(),
            cuisine: recipe.cuisine.clone(),
            dietary_tags: recipe.dietary_tags.clone(),
            meal_type: recipe.meal_type.clone(),
            spice_level: recipe.spice_level,
            calories: recipe.calories,
            protein: recipe.protein,
            author: recipe.author.clone(),
            rating: None,
            review_count: None,
            created_at: now,
            updated_at: now,
        };
        data.recipes.push(created.clone());
        Ok(created)
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, ApiError> {
        let mut data = self.lock();
        data.check()?;
        let recipe = data
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("recipe", id))?;

        if let Some(title) = &patch.title {
            recipe.title = title.clone();
        }
        if let Some(description) = &patch.description {
            recipe.description = description.clone();
        }
        if let Some(ingredients) = &patch.ingredients {
            recipe.ingredients = ingredients.clone();
        }
        if let Some(instructions) = &patch.instructions {
            recipe.instructions = instructions.clone();
        }
        if let Some(prep_time) = patch.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(cook_time) = patch.cook_time {
            recipe.cook_time = cook_time;
        }
        if let Some(servings) = patch.servings {
            recipe.servings = servings;
        }
        if let Some(category) = &patch.category {
            recipe.category = category.clone();
        }
        recipe.updated_at = Utc::now();
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), ApiError> {
        let mut data = self.lock();
        data.check()?;
        let before = data.recipes.len();
        data.recipes.retain(|r| r.id != id);
        if data.recipes.len() == before {
            return Err(not_found("recipe", id));
        }
        Ok(())
    }

    async fn reviews_for_recipe(&self, recipe_id: &str) -> Result<Vec<Review>, ApiError> {
        let data = self.lock();
        data.check()?;
        Ok(data
            .reviews
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<Review>, ApiError> {
        let data = self.lock();
        data.check()?;
        Ok(data
            .reviews
            .iter()
            .filter(|r| r.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn get_review(&self, id: &str) -> Result<Review, ApiError> {
        let data = self.lock();
        data.check()?;
        data.reviews
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("review", id))
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let mut data = self.lock();
        data.check()?;
        let created = Review {
            id: data.next_id(),
            recipe_id: review.recipe_id.clone(),
            author_id: review.author_id.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        };
        data.reviews.push(created.clone());
        Ok(created)
    }

    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<Review, ApiError> {
        let mut data = self.lock();
        data.check()?;
        let review = data
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("review", id))?;

        if let Some(rating) = patch.rating {
            review.rating = rating;
        }
        if let Some(comment) = &patch.comment {
            review.comment = comment.clone();
        }
        Ok(review.clone())
    }

    async fn delete_review(&self, id: &str) -> Result<(), ApiError> {
        let mut data = self.lock();
        data.check()?;
        let before = data.reviews.len();
        data.reviews.retain(|r| r.id != id);
        if data.reviews.len() == before {
            return Err(not_found("review", id));
        }
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let data = self.lock();
        data.check()?;
        data.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("user", id))
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>, ApiError> {
        let data = self.lock();
        data.check()?;
        Ok(data
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let mut data = self.lock();
        data.check()?;
        let now = Utc::now();
        let user = User {
            id: data.next_id(),
            email: credentials.email.clone(),
            bookmarks: vec![],
            created_at: Some(now),
            updated_at: Some(now),
        };
        data.users.push(user.clone());
        Ok(user)
    }
}
