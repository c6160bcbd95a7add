use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::ValidJson;
use crate::models::list::{
    AddItemRequest, CreateListRequest, ListDetailResponse, ListItemResponse, ListSummary,
    MyListsResponse, ReorderItemsRequest, ShareListRequest, ShareResponse, UpdateListRequest,
    UpdateShareRequest,
};
use crate::services::ListService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Lists",
    operation_id = "myLists",
    summary = "Lists owned by or shared with the caller",
    responses(
        (status = 200, description = "Owned and shared lists", body = MyListsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn my_lists(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MyListsResponse>, AppError> {
    Ok(Json(
        ListService::new(&state.db)
            .for_user(auth_user.user_id)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Lists",
    operation_id = "createList",
    summary = "Create a list",
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "List created", body = ListSummary),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let list = ListService::new(&state.db)
        .create(auth_user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Lists",
    operation_id = "getList",
    summary = "Get a list with its items",
    description = "Public lists are visible to everyone. Private lists return 404 to anyone but the owner and share holders.",
    params(("id" = i32, Path, description = "List ID")),
    responses(
        (status = 200, description = "List and ordered items", body = ListDetailResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "List not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer), fields(id = id))]
pub async fn get_list(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ListDetailResponse>, AppError> {
    Ok(Json(
        ListService::new(&state.db)
            .get(id, viewer.map(|u| u.user_id))
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Lists",
    operation_id = "updateList",
    summary = "Update a list",
    description = "PATCH semantics. Allowed for the owner and edit-level share holders.",
    params(("id" = i32, Path, description = "List ID")),
    request_body = UpdateListRequest,
    responses(
        (status = 200, description = "List updated", body = ListSummary),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = id, user_id = auth_user.user_id))]
pub async fn update_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateListRequest>,
) -> Result<Json<ListSummary>, AppError> {
    Ok(Json(
        ListService::new(&state.db)
            .update(id, auth_user.user_id, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Lists",
    operation_id = "deleteList",
    summary = "Delete a list",
    description = "Only the owner may delete a list.",
    params(("id" = i32, Path, description = "List ID")),
    responses(
        (status = 204, description = "List deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = id, user_id = auth_user.user_id))]
pub async fn delete_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ListService::new(&state.db)
        .delete(id, auth_user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/items",
    tag = "List Items",
    operation_id = "addListItem",
    summary = "Append an entry to a list",
    description = "The entry must match the list's content type. Allowed for the owner and edit-level share holders.",
    params(("id" = i32, Path, description = "List ID")),
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Item added", body = ListItemResponse),
        (status = 400, description = "Wrong content type (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List or entry not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Entry already in list (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = id, entry_id = payload.entry_id))]
pub async fn add_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<AddItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item = ListService::new(&state.db)
        .add_item(id, auth_user.user_id, payload.entry_id)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    delete,
    path = "/{id}/items/{entry_id}",
    tag = "List Items",
    operation_id = "removeListItem",
    summary = "Remove an entry from a list",
    description = "Remaining items keep their order and are renumbered without gaps.",
    params(
        ("id" = i32, Path, description = "List ID"),
        ("entry_id" = i32, Path, description = "Catalog entry ID"),
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List or item not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = id, entry_id = entry_id))]
pub async fn remove_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    ListService::new(&state.db)
        .remove_item(id, auth_user.user_id, entry_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/items/reorder",
    tag = "List Items",
    operation_id = "reorderListItems",
    summary = "Reorder a list",
    description = "`entry_ids` must name every item of the list exactly once; positions are assigned 0, 1, 2, ... by array index. `content_type` must equal the list's type. Unknown ids return 409, duplicates or omissions 400. Nothing is written on rejection.",
    params(("id" = i32, Path, description = "List ID")),
    request_body = ReorderItemsRequest,
    responses(
        (status = 200, description = "Items in their new order", body = [ListItemResponse]),
        (status = 400, description = "Invalid ordering (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Entry not in list (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = id, items = payload.entry_ids.len()))]
pub async fn reorder_items(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<ReorderItemsRequest>,
) -> Result<Json<Vec<ListItemResponse>>, AppError> {
    Ok(Json(
        ListService::new(&state.db)
            .reorder(id, auth_user.user_id, payload.content_type, &payload.entry_ids)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/shares",
    tag = "List Sharing",
    operation_id = "listShares",
    summary = "Users a list is shared with",
    params(("id" = i32, Path, description = "List ID")),
    responses(
        (status = 200, description = "Shares", body = [ShareResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member of the list (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = id))]
pub async fn list_shares(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ShareResponse>>, AppError> {
    Ok(Json(
        ListService::new(&state.db)
            .shares(id, auth_user.user_id)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/shares",
    tag = "List Sharing",
    operation_id = "shareList",
    summary = "Share a list with a user",
    description = "Allowed for the owner and edit-level share holders. `can_edit` grants edit access; otherwise the grant is view-only.",
    params(("id" = i32, Path, description = "List ID")),
    request_body = ShareListRequest,
    responses(
        (status = 201, description = "Share created", body = ShareResponse),
        (status = 400, description = "Sharing with the owner (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already shared (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = id, target = payload.user_id))]
pub async fn share_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<ShareListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let share = ListService::new(&state.db)
        .share(id, auth_user.user_id, payload.user_id, payload.can_edit)
        .await?;
    Ok((StatusCode::CREATED, Json(share)))
}

#[utoipa::path(
    patch,
    path = "/{id}/shares/{user_id}",
    tag = "List Sharing",
    operation_id = "updateShare",
    summary = "Change a share's access level",
    params(
        ("id" = i32, Path, description = "List ID"),
        ("user_id" = i32, Path, description = "User the list is shared with"),
    ),
    request_body = UpdateShareRequest,
    responses(
        (status = 200, description = "Share updated", body = ShareResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List or share not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = id, user_id = user_id))]
pub async fn update_share(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
    ValidJson(payload): ValidJson<UpdateShareRequest>,
) -> Result<Json<ShareResponse>, AppError> {
    Ok(Json(
        ListService::new(&state.db)
            .update_share(id, auth_user.user_id, user_id, payload.can_edit)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/shares/{user_id}",
    tag = "List Sharing",
    operation_id = "unshareList",
    summary = "Revoke a share",
    description = "Allowed for the owner and edit-level share holders. Any share holder may remove their own share.",
    params(
        ("id" = i32, Path, description = "List ID"),
        ("user_id" = i32, Path, description = "User the list is shared with"),
    ),
    responses(
        (status = 204, description = "Share revoked"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "View-only access (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "List or share not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = id, user_id = user_id))]
pub async fn unshare_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    ListService::new(&state.db)
        .unshare(id, auth_user.user_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
