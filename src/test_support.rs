//! Shared fixture builders for unit tests.

use chrono::{TimeZone, Utc};

use crate::types::{Recipe, Review, User};

pub(crate) fn recipe(id: &str, prep: u32, cook: u32, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: format!("Recipe {}", id),
        description: String::new(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        instructions: String::new(),
        prep_time: prep,
        cook_time: cook,
        servings: 2,
        category: "Other".to_string(),
        image_url: None,
        cuisine: None,
        dietary_tags: vec![],
        meal_type: vec![],
        spice_level: None,
        calories: None,
        protein: None,
        author: None,
        rating: None,
        review_count: None,
        created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        updated_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    }
}

pub(crate) fn review(id: &str, recipe_id: &str, rating: f32) -> Review {
    review_by(id, recipe_id, "u1", rating)
}

pub(crate) fn review_by(id: &str, recipe_id: &str, author_id: &str, rating: f32) -> Review {
    Review {
        id: id.to_string(),
        recipe_id: recipe_id.to_string(),
        author_id: author_id.to_string(),
        rating,
        comment: String::new(),
        created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    }
}

pub(crate) fn user(id: &str, bookmarks: &[&str]) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        bookmarks: bookmarks.iter().map(|s| s.to_string()).collect(),
        created_at: None,
        updated_at: None,
    }
}
