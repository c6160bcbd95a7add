use chrono::Utc;
use cinelog_common::{ContentType, VoteChange, VotePolarity, VoteState, VoteTally};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    SqlErr, TransactionSession, TransactionTrait,
};
use tracing::debug;

use super::catalog::find_entry;
use crate::entity::{review, review_vote};
use crate::error::AppError;
use crate::models::review::VoteResponse;

pub struct VoteService<'a, C> {
    conn: &'a C,
}

impl<'a, C> VoteService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Cast an up- or downvote on a review.
    ///
    /// Casting the vote the viewer already holds retracts it; casting the
    /// opposite one switches it and keeps the original vote time. The review
    /// row stays locked until commit, so concurrent casts by the same viewer
    /// apply one after the other.
    pub async fn cast(
        &self,
        voter_id: i32,
        content_type: ContentType,
        entry_id: i32,
        review_id: i32,
        polarity: VotePolarity,
    ) -> Result<VoteResponse, AppError> {
        let txn = self.conn.begin().await?;
        find_entry(&txn, content_type, entry_id).await?;

        review::Entity::find_by_id(review_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .filter(|r| r.entry_id == entry_id)
            .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

        let existing = review_vote::Entity::find_by_id((review_id, voter_id))
            .one(&txn)
            .await?
            .map(|v| v.polarity);
        let change = VoteChange::plan(existing, polarity);

        match change {
            VoteChange::Record(p) => {
                let inserted = review_vote::ActiveModel {
                    review_id: Set(review_id),
                    voter_id: Set(voter_id),
                    polarity: Set(p),
                    created_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await;
                match inserted {
                    Ok(_) => {}
                    Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                        return Err(AppError::Conflict(
                            "Vote changed concurrently, please retry".into(),
                        ));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            VoteChange::Switch { to, .. } => {
                review_vote::Entity::update_many()
                    .col_expr(review_vote::Column::Polarity, Expr::value(to))
                    .filter(review_vote::Column::ReviewId.eq(review_id))
                    .filter(review_vote::Column::VoterId.eq(voter_id))
                    .exec(&txn)
                    .await?;
            }
            VoteChange::Retract(_) => {
                review_vote::Entity::delete_by_id((review_id, voter_id))
                    .exec(&txn)
                    .await?;
            }
        }

        let tally: VoteTally = review_vote::Entity::find()
            .filter(review_vote::Column::ReviewId.eq(review_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|v| v.polarity)
            .collect();

        txn.commit().await?;

        let state = VoteState::from_current(change.outcome());
        debug!(review_id, voter_id, ?change, "Vote applied");
        Ok(VoteResponse {
            review_id,
            is_upvoted: state.is_upvoted,
            is_downvoted: state.is_downvoted,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            score: tally.score(),
        })
    }
}
