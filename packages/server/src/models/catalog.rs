use chrono::{DateTime, Utc};
use cinelog_common::{ContentType, RatingSummary};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, Validate, double_option, validate_max_len, validate_name};
use crate::entity::catalog_entry;
use crate::error::AppError;

const MAX_OVERVIEW_CHARS: usize = 20_000;
const MIN_YEAR: i32 = 1800;
const MAX_YEAR: i32 = 2200;

fn validate_year(year: i32) -> Result<(), AppError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::Validation(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}"
        )));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEntryRequest {
    pub content_type: ContentType,
    #[schema(example = "Heat")]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[schema(example = 1995)]
    pub year: Option<i32>,
    /// Required for seasons (a series) and episodes (a season); rejected otherwise.
    pub parent_id: Option<i32>,
}

impl Validate for CreateEntryRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_name("Title", &self.title)?;
        validate_max_len("Overview", &self.overview, MAX_OVERVIEW_CHARS)?;
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        Ok(())
    }
}

/// PATCH body; absent fields are left unchanged.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
}

impl Validate for UpdateEntryRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(ref title) = self.title {
            validate_name("Title", title)?;
        }
        if let Some(ref overview) = self.overview {
            validate_max_len("Overview", overview, MAX_OVERVIEW_CHARS)?;
        }
        if let Some(Some(year)) = self.year {
            validate_year(year)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EntryResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub content_type: ContentType,
    #[schema(example = "Heat")]
    pub title: String,
    pub overview: String,
    #[schema(example = 1995)]
    pub year: Option<i32>,
    pub parent_id: Option<i32>,
    /// Aggregated over every review of the entry.
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntryResponse {
    pub fn new(m: catalog_entry::Model, rating: RatingSummary) -> Self {
        Self {
            id: m.id,
            content_type: m.content_type,
            title: m.title,
            overview: m.overview,
            year: m.year,
            parent_id: m.parent_id,
            rating,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EntryListResponse {
    pub data: Vec<EntryResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntryListQuery {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<u64>,
    /// Items per page (1-100). Defaults to 20.
    pub per_page: Option<u64>,
    /// Only entries of this type.
    pub content_type: Option<ContentType>,
    /// Case-insensitive title search.
    pub search: Option<String>,
    /// One of `created_at` (default), `title`, `year`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// Sortable columns of the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySort {
    CreatedAt,
    Title,
    Year,
}

impl EntrySort {
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            None | Some("created_at") => Ok(Self::CreatedAt),
            Some("title") => Ok(Self::Title),
            Some("year") => Ok(Self::Year),
            Some(_) => Err(AppError::Validation(
                "sort_by must be one of: created_at, title, year".into(),
            )),
        }
    }
}
