use chrono::{DateTime, Utc};
use cinelog_common::{VotePolarity, VoteState, VoteTally};
use serde::{Deserialize, Serialize};

use super::catalog::EntryResponse;
use super::shared::{Pagination, Validate};
use crate::error::AppError;

pub const MAX_REVIEW_CHARS: usize = 20_000;

/// Body for both submitting and editing a review.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    /// Opaque review text (rich-text markup is stored as-is).
    #[schema(example = "Tense, patient, and the diner scene holds up.")]
    pub content: String,
    /// 0 to 10 in steps of 0.5.
    #[schema(example = 8.5)]
    pub rating: f64,
}

impl Validate for ReviewRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.content.trim().is_empty() {
            return Err(AppError::Validation("Review content must not be empty".into()));
        }
        if self.content.chars().count() > MAX_REVIEW_CHARS {
            return Err(AppError::Validation(format!(
                "Review content must be at most {MAX_REVIEW_CHARS} characters"
            )));
        }
        cinelog_common::Rating::from_points(self.rating)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ReviewAuthor {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "film_buff")]
    pub username: String,
}

/// A review as stored, without vote annotations.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub entry_id: i32,
    pub author_id: i32,
    pub content: String,
    #[schema(example = 8.5)]
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<crate::entity::review::Model> for ReviewResponse {
    fn from(m: crate::entity::review::Model) -> Self {
        Self {
            id: m.id,
            entry_id: m.entry_id,
            author_id: m.author_id,
            content: m.content,
            rating: f64::from(m.rating) / 2.0,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A review inside a review page, annotated for the current viewer.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewView {
    pub id: i32,
    pub content: String,
    #[schema(example = 8.5)]
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author: ReviewAuthor,
    pub upvotes: u64,
    pub downvotes: u64,
    /// Always false for anonymous viewers.
    pub is_upvoted: bool,
    pub is_downvoted: bool,
}

impl ReviewView {
    pub fn new(
        review: crate::entity::review::Model,
        author: ReviewAuthor,
        tally: VoteTally,
        state: VoteState,
    ) -> Self {
        Self {
            id: review.id,
            content: review.content,
            rating: f64::from(review.rating) / 2.0,
            created_at: review.created_at,
            updated_at: review.updated_at,
            author,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            is_upvoted: state.is_upvoted,
            is_downvoted: state.is_downvoted,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewPageResponse {
    pub entry: EntryResponse,
    pub reviews: Vec<ReviewView>,
    /// Over every review of the entry, not just this page.
    #[schema(example = 7.25)]
    pub average_rating: f64,
    pub total_reviews: u64,
    /// Whether the viewer has reviewed this entry. False for anonymous viewers.
    pub is_reviewed: bool,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewPageQuery {
    /// Page number (1-based). Pages past the end are empty.
    pub page: Option<u64>,
    /// One of `created_at` (default), `updated_at`, `rating`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// Orderings of a review page. Ties are broken by review id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSort {
    CreatedAt,
    /// Never-edited reviews sort last.
    UpdatedAt,
    Rating,
}

impl ReviewSort {
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            None | Some("created_at") => Ok(Self::CreatedAt),
            Some("updated_at") => Ok(Self::UpdatedAt),
            Some("rating") => Ok(Self::Rating),
            Some(_) => Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, rating".into(),
            )),
        }
    }
}

/// Result of casting a vote: the viewer's new state and the review's counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct VoteResponse {
    pub review_id: i32,
    pub is_upvoted: bool,
    pub is_downvoted: bool,
    pub upvotes: u64,
    pub downvotes: u64,
    /// Upvotes minus downvotes.
    pub score: i64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VotersQuery {
    /// `up` (default) or `down`.
    pub polarity: Option<VotePolarity>,
    pub page: Option<u64>,
    /// Items per page (1-100). Defaults to 20.
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Voter {
    pub user_id: i32,
    pub username: String,
    pub voted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VotersResponse {
    pub review_id: i32,
    pub polarity: VotePolarity,
    pub data: Vec<Voter>,
    pub pagination: Pagination,
}
