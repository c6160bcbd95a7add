use cinelog_common::PageWindow;
use sea_orm::Order;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Field-level checks run by the `ValidJson` extractor before a handler sees the body.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

/// Pagination metadata included in list responses.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 5)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 10)]
    pub total_pages: u64,
}

impl From<PageWindow> for Pagination {
    fn from(w: PageWindow) -> Self {
        Self {
            page: w.page,
            per_page: w.per_page,
            total: w.total,
            total_pages: w.total_pages(),
        }
    }
}

/// Parse a `sort_order` query value (`asc` or `desc`, default `desc`).
pub fn parse_sort_order(value: Option<&str>) -> Result<Order, AppError> {
    match value {
        None | Some("desc") => Ok(Order::Desc),
        Some("asc") => Ok(Order::Asc),
        Some(other) => Err(AppError::Validation(format!(
            "sort_order must be asc or desc, got '{other}'"
        ))),
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed name or title (1-256 Unicode characters).
pub fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > 256 {
        return Err(AppError::Validation(format!(
            "{field} must be 1-256 characters"
        )));
    }
    Ok(())
}

/// Validate free text that may be empty but has an upper bound.
pub fn validate_max_len(field: &str, value: &str, max_chars: usize) -> Result<(), AppError> {
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}
