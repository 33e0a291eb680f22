use thiserror::Error;

/// Errors from the pure derivation layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error("Recipe collection has not been loaded")]
    RecipesNotLoaded,

    #[error("Review {review_id} has rating {rating}, outside the valid range 1-5")]
    InvalidRating { review_id: String, rating: f32 },

    #[error("Unknown filter facet: {0}")]
    UnknownFacet(String),

    #[error("Invalid value {value:?} for filter facet {key:?}")]
    UnknownFacetValue { key: String, value: String },
}

/// Errors from the fetch layer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// A message suitable for direct display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { status, message } => {
                format!("Server Error (Status {}): {}", status, message)
            }
            ApiError::RequestFailed(e) => format!("Client Error: {}", e),
            ApiError::InvalidUrl(_) | ApiError::Encode(_) => {
                "An unknown error occurred!".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_user_message() {
        let err = ApiError::Status {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(err.user_message(), "Server Error (Status 404): Not Found");
    }

    #[test]
    fn test_invalid_rating_display() {
        let err = DeriveError::InvalidRating {
            review_id: "r1".to_string(),
            rating: 7.0,
        };
        assert!(err.to_string().contains("r1"));
        assert!(err.to_string().contains('7'));
    }
}
