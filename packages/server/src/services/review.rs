use std::collections::HashMap;

use chrono::Utc;
use cinelog_common::{
    ContentType, PageWindow, Rating, RatingSummary, VotePolarity, VoteState, VoteTally,
};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionSession,
    TransactionTrait,
};
use tracing::info;

use super::catalog::find_entry;
use crate::entity::{review, review_vote, user};
use crate::error::AppError;
use crate::models::catalog::EntryResponse;
use crate::models::review::{
    ReviewAuthor, ReviewPageResponse, ReviewSort, ReviewView, Voter, VotersResponse,
};

/// How to slice and order a review page.
#[derive(Debug, Clone)]
pub struct ReviewPageParams {
    pub page: Option<u64>,
    pub per_page: u64,
    pub sort: ReviewSort,
    pub order: Order,
}

fn already_reviewed() -> AppError {
    AppError::Conflict("You have already reviewed this title".into())
}

/// Load a review, requiring it to belong to the given entry.
pub(crate) async fn find_review_of_entry<C: ConnectionTrait>(
    conn: &C,
    entry_id: i32,
    review_id: i32,
) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(review_id)
        .one(conn)
        .await?
        .filter(|r| r.entry_id == entry_id)
        .ok_or_else(|| AppError::NotFound("Review not found".into()))
}

/// Usernames for a set of user ids, in one query.
pub(crate) async fn usernames<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, String>, AppError> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, String)> = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows.into_iter().collect())
}

fn summary_from_row(count: i64, sum: Option<i64>) -> RatingSummary {
    RatingSummary::from_totals(u64::try_from(count).unwrap_or(0), sum.unwrap_or(0))
}

pub struct ReviewService<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ReviewService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Average rating and count over every review of one entry.
    pub async fn summary(&self, entry_id: i32) -> Result<RatingSummary, AppError> {
        let row: Option<(i64, Option<i64>)> = review::Entity::find()
            .filter(review::Column::EntryId.eq(entry_id))
            .select_only()
            .column_as(review::Column::Id.count(), "review_count")
            .column_as(review::Column::Rating.sum(), "rating_sum")
            .into_tuple()
            .one(self.conn)
            .await?;
        Ok(row
            .map(|(count, sum)| summary_from_row(count, sum))
            .unwrap_or(RatingSummary::EMPTY))
    }

    /// Summaries for many entries with a single grouped query.
    ///
    /// Entries without reviews are absent from the map.
    pub async fn summaries(&self, entry_ids: &[i32]) -> Result<HashMap<i32, RatingSummary>, AppError> {
        if entry_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i32, i64, Option<i64>)> = review::Entity::find()
            .filter(review::Column::EntryId.is_in(entry_ids.iter().copied()))
            .select_only()
            .column(review::Column::EntryId)
            .column_as(review::Column::Id.count(), "review_count")
            .column_as(review::Column::Rating.sum(), "rating_sum")
            .group_by(review::Column::EntryId)
            .into_tuple()
            .all(self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(entry_id, count, sum)| (entry_id, summary_from_row(count, sum)))
            .collect())
    }

    /// Assemble one page of an entry's reviews for a viewer.
    ///
    /// The aggregate covers all reviews; only the window is paginated. A page
    /// past the end yields no reviews rather than an error.
    pub async fn page(
        &self,
        content_type: ContentType,
        entry_id: i32,
        viewer: Option<i32>,
        params: ReviewPageParams,
    ) -> Result<ReviewPageResponse, AppError> {
        let entry = find_entry(self.conn, content_type, entry_id).await?;
        let summary = self.summary(entry.id).await?;
        let window = PageWindow::new(params.page, params.per_page, summary.total_reviews);

        let reviews = if window.is_past_end() {
            Vec::new()
        } else {
            let select = review::Entity::find().filter(review::Column::EntryId.eq(entry.id));
            let select = match params.sort {
                ReviewSort::CreatedAt => {
                    select.order_by(review::Column::CreatedAt, params.order.clone())
                }
                ReviewSort::UpdatedAt => select.order_by_with_nulls(
                    review::Column::UpdatedAt,
                    params.order.clone(),
                    NullOrdering::Last,
                ),
                ReviewSort::Rating => select.order_by(review::Column::Rating, params.order.clone()),
            };
            select
                .order_by(review::Column::Id, params.order)
                .offset(Some(window.offset()))
                .limit(Some(window.per_page))
                .all(self.conn)
                .await?
        };

        let authors = usernames(self.conn, reviews.iter().map(|r| r.author_id)).await?;

        let mut votes_by_review: HashMap<i32, Vec<(i32, VotePolarity)>> = HashMap::new();
        if !reviews.is_empty() {
            let votes = review_vote::Entity::find()
                .filter(review_vote::Column::ReviewId.is_in(reviews.iter().map(|r| r.id)))
                .all(self.conn)
                .await?;
            for vote in votes {
                votes_by_review
                    .entry(vote.review_id)
                    .or_default()
                    .push((vote.voter_id, vote.polarity));
            }
        }

        let views = reviews
            .into_iter()
            .map(|r| {
                let votes = votes_by_review.remove(&r.id).unwrap_or_default();
                let tally: VoteTally = votes.iter().map(|(_, p)| *p).collect();
                let state = VoteState::resolve(viewer, votes);
                let author = ReviewAuthor {
                    id: r.author_id,
                    username: authors.get(&r.author_id).cloned().unwrap_or_default(),
                };
                ReviewView::new(r, author, tally, state)
            })
            .collect();

        let is_reviewed = match viewer {
            Some(user_id) => {
                review::Entity::find()
                    .filter(review::Column::EntryId.eq(entry.id))
                    .filter(review::Column::AuthorId.eq(user_id))
                    .count(self.conn)
                    .await?
                    > 0
            }
            None => false,
        };

        Ok(ReviewPageResponse {
            entry: EntryResponse::new(entry, summary),
            reviews: views,
            average_rating: summary.average_rating,
            total_reviews: summary.total_reviews,
            is_reviewed,
            pagination: window.into(),
        })
    }

    /// Users who cast `polarity` on a review, oldest vote first.
    pub async fn voters(
        &self,
        content_type: ContentType,
        entry_id: i32,
        review_id: i32,
        polarity: VotePolarity,
        page: Option<u64>,
        per_page: u64,
    ) -> Result<VotersResponse, AppError> {
        find_entry(self.conn, content_type, entry_id).await?;
        find_review_of_entry(self.conn, entry_id, review_id).await?;

        let select = review_vote::Entity::find()
            .filter(review_vote::Column::ReviewId.eq(review_id))
            .filter(review_vote::Column::Polarity.eq(polarity));
        let total = select.clone().count(self.conn).await?;
        let window = PageWindow::new(page, per_page, total);

        let votes = if window.is_past_end() {
            Vec::new()
        } else {
            select
                .order_by_asc(review_vote::Column::CreatedAt)
                .order_by_asc(review_vote::Column::VoterId)
                .offset(Some(window.offset()))
                .limit(Some(window.per_page))
                .all(self.conn)
                .await?
        };

        let names = usernames(self.conn, votes.iter().map(|v| v.voter_id)).await?;
        let data = votes
            .into_iter()
            .map(|v| Voter {
                user_id: v.voter_id,
                username: names.get(&v.voter_id).cloned().unwrap_or_default(),
                voted_at: v.created_at,
            })
            .collect();

        Ok(VotersResponse {
            review_id,
            polarity,
            data,
            pagination: window.into(),
        })
    }
}

impl<'a, C> ReviewService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    /// Create the author's review of an entry. One review per author and entry.
    pub async fn submit(
        &self,
        content_type: ContentType,
        entry_id: i32,
        author_id: i32,
        content: String,
        rating: Rating,
    ) -> Result<review::Model, AppError> {
        let txn = self.conn.begin().await?;
        find_entry(&txn, content_type, entry_id).await?;

        let existing = review::Entity::find()
            .filter(review::Column::EntryId.eq(entry_id))
            .filter(review::Column::AuthorId.eq(author_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(already_reviewed());
        }

        let inserted = review::ActiveModel {
            entry_id: Set(entry_id),
            author_id: Set(author_id),
            content: Set(content),
            rating: Set(rating.half_points()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await;
        let model = match inserted {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(already_reviewed());
            }
            Err(e) => return Err(e.into()),
        };

        txn.commit().await?;
        info!(review_id = model.id, entry_id, author_id, "Review submitted");
        Ok(model)
    }

    /// Replace the content and rating of the author's existing review.
    pub async fn update(
        &self,
        content_type: ContentType,
        entry_id: i32,
        author_id: i32,
        content: String,
        rating: Rating,
    ) -> Result<review::Model, AppError> {
        let txn = self.conn.begin().await?;
        let existing = self
            .own_review(&txn, content_type, entry_id, author_id)
            .await?;

        let mut active: review::ActiveModel = existing.into();
        active.content = Set(content);
        active.rating = Set(rating.half_points());
        active.updated_at = Set(Some(Utc::now()));
        let model = active.update(&txn).await?;

        txn.commit().await?;
        Ok(model)
    }

    /// Delete the author's review of an entry along with its votes.
    pub async fn remove(
        &self,
        content_type: ContentType,
        entry_id: i32,
        author_id: i32,
    ) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let existing = self
            .own_review(&txn, content_type, entry_id, author_id)
            .await?;

        review_vote::Entity::delete_many()
            .filter(review_vote::Column::ReviewId.eq(existing.id))
            .exec(&txn)
            .await?;
        let review_id = existing.id;
        existing.delete(&txn).await?;

        txn.commit().await?;
        info!(review_id, entry_id, author_id, "Review removed");
        Ok(())
    }

    async fn own_review<T: ConnectionTrait>(
        &self,
        conn: &T,
        content_type: ContentType,
        entry_id: i32,
        author_id: i32,
    ) -> Result<review::Model, AppError> {
        find_entry(conn, content_type, entry_id).await?;
        review::Entity::find()
            .filter(review::Column::EntryId.eq(entry_id))
            .filter(review::Column::AuthorId.eq(author_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("You have not reviewed this title".into()))
    }
}
