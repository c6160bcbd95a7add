use chrono::{DateTime, Utc};
use cinelog_common::{ContentType, ListRole, SharePermission};
use serde::{Deserialize, Serialize};

use super::shared::{Validate, validate_max_len, validate_name};
use crate::entity::{list_share, user_list};
use crate::error::AppError;

const MAX_DESCRIPTION_CHARS: usize = 2_000;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateListRequest {
    #[schema(example = "Heist films")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Every item of the list must be of this type.
    pub content_type: ContentType,
    #[serde(default)]
    pub is_public: bool,
}

impl Validate for CreateListRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_name("Name", &self.name)?;
        validate_max_len("Description", &self.description, MAX_DESCRIPTION_CHARS)
    }
}

#[derive(Debug, Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl Validate for UpdateListRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(ref name) = self.name {
            validate_name("Name", name)?;
        }
        if let Some(ref description) = self.description {
            validate_max_len("Description", description, MAX_DESCRIPTION_CHARS)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddItemRequest {
    pub entry_id: i32,
}

impl Validate for AddItemRequest {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderItemsRequest {
    /// Must equal the list's content type.
    pub content_type: ContentType,
    /// Every entry of the list, in the new order. Positions are assigned 0, 1, 2, ...
    pub entry_ids: Vec<i32>,
}

impl Validate for ReorderItemsRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.entry_ids.is_empty() {
            return Err(AppError::Validation(
                "entry_ids must contain at least one item".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ShareListRequest {
    pub user_id: i32,
    #[serde(default)]
    pub can_edit: bool,
}

impl Validate for ShareListRequest {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateShareRequest {
    pub can_edit: bool,
}

impl Validate for UpdateShareRequest {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListItemResponse {
    pub entry_id: i32,
    pub title: String,
    pub content_type: ContentType,
    pub year: Option<i32>,
    /// Zero-based; the items of a list are always numbered 0..n.
    pub position: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListSummary {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub description: String,
    pub content_type: ContentType,
    pub is_public: bool,
    pub item_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListSummary {
    pub fn new(m: user_list::Model, item_count: u64) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            name: m.name,
            description: m.description,
            content_type: m.content_type,
            is_public: m.is_public,
            item_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListDetailResponse {
    #[serde(flatten)]
    pub list: ListSummary,
    /// The caller's relation to the list; absent for anonymous or unrelated viewers of a public list.
    pub role: Option<ListRole>,
    pub items: Vec<ListItemResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MyListsResponse {
    pub owned: Vec<ListSummary>,
    pub shared_with_me: Vec<ListSummary>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ShareResponse {
    pub list_id: i32,
    pub user_id: i32,
    pub username: String,
    pub permission: SharePermission,
    pub created_at: DateTime<Utc>,
}

impl ShareResponse {
    pub fn new(share: list_share::Model, username: String) -> Self {
        Self {
            list_id: share.list_id,
            user_id: share.user_id,
            username,
            permission: SharePermission::from_can_edit(share.can_edit),
            created_at: share.created_at,
        }
    }
}
