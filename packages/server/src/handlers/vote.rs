use axum::Json;
use axum::extract::{Path, State};
use cinelog_common::{ContentType, VotePolarity};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::review::VoteResponse;
use crate::services::VoteService;
use crate::state::AppState;

async fn cast(
    state: &AppState,
    auth_user: &AuthUser,
    (content_type, id, review_id): (ContentType, i32, i32),
    polarity: VotePolarity,
) -> Result<Json<VoteResponse>, AppError> {
    let outcome = VoteService::new(&state.db)
        .cast(auth_user.user_id, content_type, id, review_id, polarity)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/{review_id}/upvote",
    tag = "Votes",
    operation_id = "castUpvote",
    summary = "Upvote a review",
    description = "Adds an upvote, replacing a downvote by the caller if present. Upvoting again retracts the upvote.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Caller's vote state and the review's counts", body = VoteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry or review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn cast_upvote(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(path): Path<(ContentType, i32, i32)>,
) -> Result<Json<VoteResponse>, AppError> {
    cast(&state, &auth_user, path, VotePolarity::Up).await
}

#[utoipa::path(
    post,
    path = "/{review_id}/downvote",
    tag = "Votes",
    operation_id = "castDownvote",
    summary = "Downvote a review",
    description = "Adds a downvote, replacing an upvote by the caller if present. Downvoting again retracts the downvote.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Caller's vote state and the review's counts", body = VoteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry or review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn cast_downvote(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(path): Path<(ContentType, i32, i32)>,
) -> Result<Json<VoteResponse>, AppError> {
    cast(&state, &auth_user, path, VotePolarity::Down).await
}
