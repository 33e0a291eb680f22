//! Recipe difficulty classification.
//!
//! Difficulty is derived from total time and ingredient count, never stored.

use serde::{Deserialize, Serialize};

use crate::types::Recipe;

/// Derived difficulty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Advanced,
}

impl Difficulty {
    /// Classify a recipe from (prep time + cook time) and ingredient count.
    pub fn of(recipe: &Recipe) -> Self {
        let total_time = recipe.total_time();
        let ingredient_count = recipe.ingredients.len();

        // Easy: quick recipes with few ingredients
        if total_time < 30 && ingredient_count < 6 {
            return Difficulty::Easy;
        }

        // Medium: moderate time and ingredient complexity
        if total_time < 60 && ingredient_count < 10 {
            return Difficulty::Medium;
        }

        // Advanced: time-consuming or ingredient-heavy recipes
        Difficulty::Advanced
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Parse the filter vocabulary. "hard" is an accepted alias for
    /// "advanced", matching the filter menus.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" | "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

/// Classify an optional recipe. An absent recipe is `None`, never a
/// default bucket.
pub fn classify(recipe: Option<&Recipe>) -> Option<Difficulty> {
    recipe.map(Difficulty::of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::recipe;

    #[test]
    fn test_easy_recipe() {
        let r = recipe("a", 10, 15, &["flour", "water", "salt"]);
        assert_eq!(Difficulty::of(&r), Difficulty::Easy);
    }

    #[test]
    fn test_medium_recipe() {
        // 30 minutes total is no longer easy
        let r = recipe("a", 10, 20, &["flour", "water", "salt"]);
        assert_eq!(Difficulty::of(&r), Difficulty::Medium);

        // under 30 minutes but too many ingredients for easy
        let r = recipe("b", 5, 10, &["a", "b", "c", "d", "e", "f"]);
        assert_eq!(Difficulty::of(&r), Difficulty::Medium);
    }

    #[test]
    fn test_advanced_recipe() {
        let r = recipe("a", 30, 30, &["flour"]);
        assert_eq!(Difficulty::of(&r), Difficulty::Advanced);

        let many: Vec<&str> = vec!["x"; 10];
        let r = recipe("b", 5, 5, &many);
        assert_eq!(Difficulty::of(&r), Difficulty::Advanced);
    }

    #[test]
    fn test_classify_absent_recipe() {
        assert_eq!(classify(None), None);
    }

    #[test]
    fn test_from_str_accepts_hard_alias() {
        assert_eq!(Difficulty::from_str("hard"), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::from_str("Easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("extreme"), None);
    }
}
