use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cinelog_common::{ContentType, Rating, VotePolarity};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::ValidJson;
use crate::models::review::{
    ReviewPageQuery, ReviewPageResponse, ReviewRequest, ReviewResponse, ReviewSort, VotersQuery,
    VotersResponse,
};
use crate::models::shared::parse_sort_order;
use crate::services::{ReviewPageParams, ReviewService};
use crate::state::AppState;

const DEFAULT_VOTERS_PER_PAGE: u64 = 20;
const MAX_VOTERS_PER_PAGE: u64 = 100;

#[utoipa::path(
    get,
    path = "/",
    tag = "Reviews",
    operation_id = "getReviewPage",
    summary = "Review page of a catalog entry",
    description = "Returns the entry, one page of its reviews with vote counts and the caller's vote state, the rating aggregate over all reviews, and whether the caller has reviewed it. Anonymous callers see no vote state. Sort by `created_at` (default, desc), `updated_at` (unedited last) or `rating`. Pages past the end are empty.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
        ReviewPageQuery,
    ),
    responses(
        (status = 200, description = "Review page", body = ReviewPageResponse),
        (status = 400, description = "Invalid sort (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query), fields(%content_type, id = id))]
pub async fn get_review_page(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
    Query(query): Query<ReviewPageQuery>,
) -> Result<Json<ReviewPageResponse>, AppError> {
    let params = ReviewPageParams {
        page: query.page,
        per_page: state.config.reviews.page_size,
        sort: ReviewSort::parse(query.sort_by.as_deref())?,
        order: parse_sort_order(query.sort_order.as_deref())?,
    };
    let page = ReviewService::new(&state.db)
        .page(content_type, id, viewer.map(|u| u.user_id), params)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Reviews",
    operation_id = "submitReview",
    summary = "Review a catalog entry",
    description = "Creates the caller's review. Each user reviews an entry at most once; a second submission returns 409.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(%content_type, id = id, user_id = auth_user.user_id))]
pub async fn submit_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
    ValidJson(payload): ValidJson<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let rating = Rating::from_points(payload.rating)?;
    let review = ReviewService::new(&state.db)
        .submit(content_type, id, auth_user.user_id, payload.content, rating)
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

#[utoipa::path(
    put,
    path = "/",
    tag = "Reviews",
    operation_id = "updateReview",
    summary = "Edit your review",
    description = "Replaces the content and rating of the caller's review and stamps `updated_at`.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry or review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(%content_type, id = id, user_id = auth_user.user_id))]
pub async fn update_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
    ValidJson(payload): ValidJson<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let rating = Rating::from_points(payload.rating)?;
    let review = ReviewService::new(&state.db)
        .update(content_type, id, auth_user.user_id, payload.content, rating)
        .await?;
    Ok(Json(review.into()))
}

#[utoipa::path(
    delete,
    path = "/",
    tag = "Reviews",
    operation_id = "removeReview",
    summary = "Delete your review",
    description = "Deletes the caller's review of the entry and every vote on it.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry or review not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(%content_type, id = id, user_id = auth_user.user_id))]
pub async fn remove_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((content_type, id)): Path<(ContentType, i32)>,
) -> Result<StatusCode, AppError> {
    ReviewService::new(&state.db)
        .remove(content_type, id, auth_user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{review_id}/votes",
    tag = "Reviews",
    operation_id = "listVoters",
    summary = "Users who voted on a review",
    description = "Paginated list of users who cast the given polarity (default `up`), oldest vote first.",
    params(
        ("content_type" = ContentType, Path, description = "Content type of the entry"),
        ("id" = i32, Path, description = "Entry ID"),
        ("review_id" = i32, Path, description = "Review ID"),
        VotersQuery,
    ),
    responses(
        (status = 200, description = "Voters", body = VotersResponse),
        (status = 404, description = "Entry or review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(%content_type, id = id, review_id = review_id))]
pub async fn list_voters(
    State(state): State<AppState>,
    Path((content_type, id, review_id)): Path<(ContentType, i32, i32)>,
    Query(query): Query<VotersQuery>,
) -> Result<Json<VotersResponse>, AppError> {
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_VOTERS_PER_PAGE)
        .clamp(1, MAX_VOTERS_PER_PAGE);
    let voters = ReviewService::new(&state.db)
        .voters(
            content_type,
            id,
            review_id,
            query.polarity.unwrap_or(VotePolarity::Up),
            query.page,
            per_page,
        )
        .await?;
    Ok(Json(voters))
}
