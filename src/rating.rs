//! Rating aggregation over review collections.
//!
//! Statistics are recomputed in full whenever a review set changes, never
//! patched incrementally. Collections are small (hundreds, not millions),
//! so O(n) recomputation is fine.

use serde::{Deserialize, Serialize};

use crate::error::DeriveError;
use crate::types::Review;

/// Lowest valid star rating.
pub const MIN_RATING: f32 = 1.0;
/// Highest valid star rating.
pub const MAX_RATING: f32 = 5.0;

/// Aggregated rating statistics for one recipe.
///
/// `histogram[i]` and `percentages[i]` cover the (i+1)-star bucket.
/// Percentages are rounded per element and need not sum to exactly 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingStats {
    /// Mean rating, rounded to one decimal. 0 when there are no reviews.
    pub average: f32,
    pub count: usize,
    pub histogram: [u32; 5],
    pub percentages: [u32; 5],
}

impl RatingStats {
    /// Review count for a star bucket (1-5). Out-of-range stars are 0.
    pub fn stars(&self, star: u8) -> u32 {
        match star {
            1..=5 => self.histogram[star as usize - 1],
            _ => 0,
        }
    }

    /// Percentage of reviews in a star bucket (1-5).
    pub fn percentage(&self, star: u8) -> u32 {
        match star {
            1..=5 => self.percentages[star as usize - 1],
            _ => 0,
        }
    }
}

/// Check a review's rating against the valid range.
pub(crate) fn validate_rating(review: &Review) -> Result<(), DeriveError> {
    if (MIN_RATING..=MAX_RATING).contains(&review.rating) {
        Ok(())
    } else {
        Err(DeriveError::InvalidRating {
            review_id: review.id.clone(),
            rating: review.rating,
        })
    }
}

/// Aggregate a review set into [`RatingStats`].
///
/// An empty set is the defined zero result, not an error. A rating outside
/// 1-5 is rejected; the backend does not validate ratings, so this is the
/// boundary that does. Fractional ratings are rounded to the nearest star
/// for bucketing.
pub fn aggregate(reviews: &[Review]) -> Result<RatingStats, DeriveError> {
    for review in reviews {
        validate_rating(review)?;
    }
    Ok(aggregate_unchecked(reviews))
}

/// Aggregation without range validation, for review sets that were already
/// validated at the index boundary.
pub(crate) fn aggregate_unchecked(reviews: &[Review]) -> RatingStats {
    if reviews.is_empty() {
        return RatingStats::default();
    }

    let mut histogram = [0u32; 5];
    let mut sum = 0.0f64;
    for review in reviews {
        sum += f64::from(review.rating);
        let star = (review.rating.round() as usize).clamp(1, 5);
        histogram[star - 1] += 1;
    }

    let count = reviews.len();
    let average = ((sum / count as f64) * 10.0).round() / 10.0;
    let percentages =
        histogram.map(|bucket| ((f64::from(bucket) / count as f64) * 100.0).round() as u32);

    RatingStats {
        average: average as f32,
        count,
        histogram,
        percentages,
    }
}
