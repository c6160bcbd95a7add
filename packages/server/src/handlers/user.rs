use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::user::ProfileResponse;
use crate::services::UserService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getProfile",
    summary = "Public profile of a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(UserService::new(&state.db).profile(id).await?))
}
