use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cinelog_common::ContentType;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::ValidJson;
use crate::models::catalog::{
    CreateEntryRequest, EntryListQuery, EntryListResponse, EntryResponse, UpdateEntryRequest,
};
use crate::services::CatalogService;
use crate::state::AppState;
use crate::utils::permission::{CATALOG_CREATE, CATALOG_DELETE, CATALOG_EDIT};

#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    operation_id = "listEntries",
    summary = "List catalog entries",
    description = "Paginated listing with optional content type filter and case-insensitive title search. Sort by `created_at` (default, desc), `title` or `year`. Each entry carries its rating summary.",
    params(EntryListQuery),
    responses(
        (status = 200, description = "Catalog page", body = EntryListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntryListResponse>, AppError> {
    let (data, window) = CatalogService::new(&state.db).list(query).await?;
    Ok(Json(EntryListResponse {
        data,
        pagination: window.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Catalog",
    operation_id = "createEntry",
    summary = "Create a catalog entry",
    description = "Seasons need a series `parent_id`, episodes a season `parent_id`. Requires `catalog:create` permission.",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(content_type = %payload.content_type))]
pub async fn create_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(CATALOG_CREATE)?;
    let entry = CatalogService::new(&state.db).create(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/{content_type}/{id}",
    tag = "Catalog",
    operation_id = "getEntry",
    summary = "Get a catalog entry",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry with its rating summary", body = EntryResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(%content_type, id = id))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
) -> Result<Json<EntryResponse>, AppError> {
    Ok(Json(
        CatalogService::new(&state.db).get(content_type, id).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/{content_type}/{id}",
    tag = "Catalog",
    operation_id = "updateEntry",
    summary = "Update a catalog entry",
    description = "PATCH semantics: only provided fields change. `year: null` clears the year. Requires `catalog:edit` permission.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(%content_type, id = id))]
pub async fn update_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
    ValidJson(payload): ValidJson<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    auth_user.require_permission(CATALOG_EDIT)?;
    Ok(Json(
        CatalogService::new(&state.db)
            .update(content_type, id, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/{content_type}/{id}",
    tag = "Catalog",
    operation_id = "deleteEntry",
    summary = "Delete a catalog entry",
    description = "Deletes the entry with its reviews and votes, and removes it from every list. Requires `catalog:delete` permission. Returns 409 while seasons or episodes still reference it.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Entry has child entries (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(%content_type, id = id))]
pub async fn delete_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission(CATALOG_DELETE)?;
    CatalogService::new(&state.db)
        .delete(content_type, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
