use serde::{Deserialize, Serialize};

/// Highest rating a review can carry, in points.
pub const MAX_POINTS: f64 = 10.0;

/// Ratings are stored as whole half points: 0..=20.
const MAX_HALF_POINTS: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("Rating must be between 0 and 10")]
    OutOfRange,
    #[error("Rating must be a multiple of 0.5")]
    Precision,
}

/// A review rating between 0 and 10 with half-point precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub fn from_points(points: f64) -> Result<Self, RatingError> {
        if !points.is_finite() || !(0.0..=MAX_POINTS).contains(&points) {
            return Err(RatingError::OutOfRange);
        }
        let doubled = points * 2.0;
        if doubled.fract() != 0.0 {
            return Err(RatingError::Precision);
        }
        Self::from_half_points(doubled as i32)
    }

    pub fn from_half_points(half_points: i32) -> Result<Self, RatingError> {
        if !(0..=MAX_HALF_POINTS).contains(&half_points) {
            return Err(RatingError::OutOfRange);
        }
        Ok(Self(half_points as u8))
    }

    pub fn half_points(self) -> i32 {
        i32::from(self.0)
    }

    pub fn points(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

/// Average rating and review count of one catalog entry.
///
/// Always computed over every review of the entry, never over a page of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RatingSummary {
    /// Arithmetic mean of all ratings, 0 when there are no reviews.
    #[schema(example = 7.5)]
    pub average_rating: f64,
    #[schema(example = 12)]
    pub total_reviews: u64,
}

impl RatingSummary {
    pub const EMPTY: RatingSummary = RatingSummary {
        average_rating: 0.0,
        total_reviews: 0,
    };

    /// Build a summary from database aggregates (`COUNT(*)`, `SUM(rating)` in half points).
    pub fn from_totals(total_reviews: u64, half_point_sum: i64) -> Self {
        if total_reviews == 0 {
            return Self::EMPTY;
        }
        Self {
            average_rating: half_point_sum as f64 / 2.0 / total_reviews as f64,
            total_reviews,
        }
    }

    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let (count, sum) = ratings
            .into_iter()
            .fold((0u64, 0i64), |(count, sum), r| {
                (count + 1, sum + i64::from(r.half_points()))
            });
        Self::from_totals(count, sum)
    }
}
