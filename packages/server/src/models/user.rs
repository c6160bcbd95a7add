use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public profile of a user.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    #[schema(example = "film_buff")]
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub review_count: u64,
    /// Mean of the ratings this user has given, 0 without reviews.
    #[schema(example = 6.5)]
    pub average_rating_given: f64,
    pub public_list_count: u64,
}
