//! End-to-end tests: mock backend -> state container -> derived views.

use chrono::{Duration, TimeZone, Utc};

use skillet::api::{self, MockApi};
use skillet::{
    AppState, AuthEvent, Credentials, FacetSelection, MemoryTokenStore, NewReview, Recipe,
    RecipeApi, RecipesEvent, Review, SortKey, SpiceLevel, TokenStore, User,
};

fn recipe(id: &str, title: &str, prep: u32, cook: u32, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
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

fn review(id: &str, recipe_id: &str, author_id: &str, rating: f32) -> Review {
    Review {
        id: id.to_string(),
        recipe_id: recipe_id.to_string(),
        author_id: author_id.to_string(),
        rating,
        comment: String::new(),
        created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    }
}

fn seeded_api(now: chrono::DateTime<Utc>) -> MockApi {
    let mut pasta = recipe("1", "Weeknight Pasta", 10, 15, &["pasta", "garlic", "oil"]);
    pasta.cuisine = Some("Italian".to_string());
    pasta.dietary_tags = vec!["vegetarian".to_string()];
    pasta.meal_type = vec!["dinner".to_string()];
    pasta.created_at = now - Duration::days(2);

    let mut curry = recipe(
        "2",
        "Slow Lamb Curry",
        30,
        90,
        &["lamb", "onion", "garlic", "ginger", "yogurt", "spices", "rice"],
    );
    curry.cuisine = Some("Indian".to_string());
    curry.spice_level = Some(SpiceLevel::Hot);
    curry.meal_type = vec!["dinner".to_string()];
    curry.created_at = now - Duration::days(40);

    let mut pancakes = recipe("3", "Pancakes", 5, 15, &["flour", "milk", "egg"]);
    pancakes.meal_type = vec!["breakfast".to_string()];
    pancakes.created_at = now - Duration::days(1);

    MockApi::new()
        .with_recipes(vec![pasta, curry, pancakes])
        .with_reviews(vec![
            review("r1", "1", "u1", 5.0),
            review("r2", "1", "u2", 4.0),
            review("r3", "1", "u3", 5.0),
            review("r4", "2", "u1", 4.0),
            review("r5", "3", "u2", 3.0),
            review("r6", "3", "u3", 4.0),
        ])
        .with_users(vec![User {
            id: "u1".to_string(),
            email: "cook@example.com".to_string(),
            bookmarks: vec!["2".to_string()],
            created_at: None,
            updated_at: None,
        }])
}

async fn load_everything(api: &MockApi, state: &mut AppState) {
    api::load_recipes(api, state).await;
    let ids: Vec<String> = state
        .recipes
        .recipes()
        .iter()
        .map(|r| r.id.clone())
        .collect();
    for id in ids {
        api::load_reviews_for_recipe(api, state, &id).await.unwrap();
    }
}

#[tokio::test]
async fn test_discover_flow_filters_and_classifies() {
    let now = Utc::now();
    let api = seeded_api(now);
    let mut state = AppState::new();

    load_everything(&api, &mut state).await;
    assert!(state.recipes.is_loaded());
    assert_eq!(state.recipes.count(), 3);

    // Facet selections arrive as (key, value) pairs from the UI.
    state.recipes.apply(RecipesEvent::FacetApplied(
        FacetSelection::parse("mealType", "dinner").unwrap(),
    ));
    let dinner = state.filtered_recipes(now).unwrap();
    let ids: Vec<&str> = dinner.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);

    state.recipes.apply(RecipesEvent::FacetApplied(
        FacetSelection::parse("spiceLevel", "3").unwrap(),
    ));
    let hot_dinner = state.filtered_recipes(now).unwrap();
    assert_eq!(hot_dinner.len(), 1);
    assert_eq!(hot_dinner[0].id, "2");

    state.recipes.apply(RecipesEvent::FiltersCleared);
    assert!(!state.has_active_filters());

    // Pasta: 3 reviews averaging 4.7 -> popular; created 2 days ago with
    // 3 reviews -> trending. Pancakes: fresh but averaging 3.5 -> trending
    // only. Curry: old with one review -> neither.
    let popular: Vec<&str> = state
        .popular_recipes()
        .unwrap()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(popular, vec!["1"]);

    let trending: Vec<&str> = state
        .trending_recipes(now)
        .unwrap()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(trending, vec!["1", "3"]);

    assert!(state.is_recipe_popular("1"));
    assert!(!state.is_recipe_popular("3"));
    assert!(state.is_recipe_trending("3", now));
    assert!(!state.is_recipe_trending("2", now));

    // Popularity ranking: pasta 3x4.7=14.1, pancakes 2x3.5=7, curry 1x4=4.
    let ranked: Vec<&str> = state
        .recipes_by_popularity()
        .unwrap()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ranked, vec!["1", "3", "2"]);

    let quickest = state.sorted_recipes(SortKey::Time).unwrap();
    assert_eq!(quickest[0].id, "3");
}

#[tokio::test]
async fn test_rating_stats_update_after_submitting_review() {
    let now = Utc::now();
    let api = seeded_api(now);
    let mut state = AppState::new();
    load_everything(&api, &mut state).await;

    let stats = state.rating_stats("3");
    assert_eq!(stats.count, 2);
    assert_eq!(stats.average, 3.5);

    // A new 5-star review is created on the backend and folded into the
    // index; stats are recomputed from the full set.
    api::submit_review(
        &api,
        &mut state,
        &NewReview {
            recipe_id: "3".to_string(),
            author_id: "u9".to_string(),
            rating: 5.0,
            comment: "perfect".to_string(),
        },
    )
    .await
    .unwrap();

    let stats = state.rating_stats("3");
    assert_eq!(stats.count, 3);
    assert_eq!(stats.average, 4.0);
    assert_eq!(stats.stars(5), 1);
    assert!(state
        .reviews
        .index()
        .has_author_review("3", "u9"));
}

#[tokio::test]
async fn test_trending_facet_firms_up_as_reviews_load() {
    let now = Utc::now();
    let api = seeded_api(now);
    let mut state = AppState::new();

    api::load_recipes(&api, &mut state).await;
    state.recipes.apply(RecipesEvent::FacetApplied(
        FacetSelection::parse("isTrending", "true").unwrap(),
    ));

    // Reviews not loaded yet: the facet passes the base set through.
    assert_eq!(state.filtered_recipes(now).unwrap().len(), 3);

    api::load_reviews_for_recipe(&api, &mut state, "1").await.unwrap();
    api::load_reviews_for_recipe(&api, &mut state, "2").await.unwrap();
    api::load_reviews_for_recipe(&api, &mut state, "3").await.unwrap();

    let ids: Vec<&str> = state
        .filtered_recipes(now)
        .unwrap()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_backend_failure_surfaces_displayable_message() {
    let api = MockApi::new().with_failure("connection reset");
    let mut state = AppState::new();

    api::load_recipes(&api, &mut state).await;
    assert!(!state.recipes.is_loaded());
    assert_eq!(
        state.recipes.error(),
        Some("Server Error (Status 500): connection reset")
    );
    // Derived views still refuse to pretend the collection is empty.
    assert!(state.filtered_recipes(Utc::now()).is_err());
}

#[tokio::test]
async fn test_register_persists_session_and_bookmarks_need_auth() {
    let now = Utc::now();
    let api = seeded_api(now);
    let mut state = AppState::new();
    let mut store = MemoryTokenStore::new();
    load_everything(&api, &mut state).await;

    assert!(state.bookmarked_recipes().is_empty());

    api::register_user(
        &api,
        &mut state,
        &mut store,
        &Credentials {
            email: "new@example.com".to_string(),
            password: "hunter2".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(state.auth.is_authenticated());
    assert_eq!(store.get(), state.auth.token().map(String::from));

    // A restored session for a user with bookmarks drives the bookmark
    // view.
    state.auth.apply(AuthEvent::SessionRestored {
        user: api.get_user("u1").await.unwrap(),
        token: "session-u1".to_string(),
    });
    let bookmarked: Vec<&str> = state
        .bookmarked_recipes()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(bookmarked, vec!["2"]);

    api::logout(&mut state, &mut store).unwrap();
    assert!(!state.auth.is_authenticated());
    assert_eq!(store.get(), None);
}
