//! API client trait and the HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::types::{
    Credentials, NewRecipe, NewReview, Recipe, RecipePatch, Review, ReviewPatch, User,
};

/// CRUD surface of the backend, as a trait so tests can swap in
/// [`super::MockApi`].
///
/// The backend supports only flat query parameters (`recipeId`, `authorId`,
/// repeated `id`); multi-facet filtering happens client-side after fetch.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError>;
    async fn get_recipe(&self, id: &str) -> Result<Recipe, ApiError>;
    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError>;
    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, ApiError>;
    async fn delete_recipe(&self, id: &str) -> Result<(), ApiError>;

    async fn reviews_for_recipe(&self, recipe_id: &str) -> Result<Vec<Review>, ApiError>;
    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<Review>, ApiError>;
    async fn get_review(&self, id: &str) -> Result<Review, ApiError>;
    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError>;
    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<Review, ApiError>;
    async fn delete_review(&self, id: &str) -> Result<(), ApiError>;

    async fn get_user(&self, id: &str) -> Result<User, ApiError>;
    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>, ApiError>;
    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError>;
}

/// Default base URL of the mock JSON server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// HTTP client for the mock JSON server.
pub struct JsonApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl JsonApiClient {
    /// Create a client configured from the environment.
    ///
    /// `SKILLET_API_URL` overrides the default base URL.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            std::env::var("SKILLET_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    /// Create a client for the given base URL, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        // Joining relative paths needs a trailing slash on the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, url: Url, body: &Value) -> Result<T, ApiError> {
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn patch_json<T: DeserializeOwned>(&self, url: Url, body: &Value) -> Result<T, ApiError> {
        tracing::debug!(%url, "PATCH");
        let response = self.client.patch(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn delete(&self, url: Url) -> Result<(), ApiError> {
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Serialize a payload and stamp the given timestamp fields with the
    /// current time, the way the backend expects client-side stamps.
    fn stamped(body: &impl Serialize, keys: &[&str]) -> Result<Value, ApiError> {
        let mut value = serde_json::to_value(body)?;
        if let Value::Object(map) = &mut value {
            let now = Value::from(Utc::now().timestamp_millis());
            for key in keys {
                map.insert((*key).to_string(), now.clone());
            }
        }
        Ok(value)
    }
}

#[async_trait]
impl RecipeApi for JsonApiClient {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        self.get_json(self.endpoint("recipes")?).await
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, ApiError> {
        self.get_json(self.endpoint(&format!("recipes/{}", id))?)
            .await
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError> {
        let body = Self::stamped(recipe, &["createdAt", "updatedAt"])?;
        self.post_json(self.endpoint("recipes")?, &body).await
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, ApiError> {
        let body = Self::stamped(patch, &["updatedAt"])?;
        self.patch_json(self.endpoint(&format!("recipes/{}", id))?, &body)
            .await
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), ApiError> {
        self.delete(self.endpoint(&format!("recipes/{}", id))?).await
    }

    async fn reviews_for_recipe(&self, recipe_id: &str) -> Result<Vec<Review>, ApiError> {
        let mut url = self.endpoint("reviews")?;
        url.query_pairs_mut().append_pair("recipeId", recipe_id);
        self.get_json(url).await
    }

    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<Review>, ApiError> {
        let mut url = self.endpoint("reviews")?;
        url.query_pairs_mut().append_pair("authorId", author_id);
        self.get_json(url).await
    }

    async fn get_review(&self, id: &str) -> Result<Review, ApiError> {
        self.get_json(self.endpoint(&format!("reviews/{}", id))?)
            .await
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let body = Self::stamped(review, &["createdAt"])?;
        self.post_json(self.endpoint("reviews")?, &body).await
    }

    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<Review, ApiError> {
        let body = serde_json::to_value(patch)?;
        self.patch_json(self.endpoint(&format!("reviews/{}", id))?, &body)
            .await
    }

    async fn delete_review(&self, id: &str) -> Result<(), ApiError> {
        self.delete(self.endpoint(&format!("reviews/{}", id))?).await
    }

    async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.get_json(self.endpoint(&format!("users/{}", id))?).await
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>, ApiError> {
        let mut url = self.endpoint("users")?;
        for id in ids {
            url.query_pairs_mut().append_pair("id", id);
        }
        self.get_json(url).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let body = Self::stamped(credentials, &["createdAt", "updatedAt"])?;
        self.post_json(self.endpoint("users")?, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_base_url() {
        assert!(JsonApiClient::new("not a url").is_err());
    }

    #[test]
    fn test_endpoint_joins_relative_paths() {
        let client = JsonApiClient::new("http://localhost:3000").unwrap();
        let url = client.endpoint("recipes/7").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/recipes/7");
    }

    #[test]
    fn test_stamped_adds_timestamp_fields() {
        let review = NewReview {
            recipe_id: "a".to_string(),
            author_id: "u1".to_string(),
            rating: 5.0,
            comment: "great".to_string(),
        };
        let body = JsonApiClient::stamped(&review, &["createdAt"]).unwrap();
        assert!(body.get("createdAt").is_some_and(Value::is_i64));
        assert_eq!(body.get("recipeId").and_then(Value::as_str), Some("a"));
    }
}
