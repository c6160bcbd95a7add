use cinelog_common::RatingSummary;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::entity::{review, user, user_list};
use crate::error::AppError;
use crate::models::user::ProfileResponse;

pub struct UserService<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn profile(&self, user_id: i32) -> Result<ProfileResponse, AppError> {
        let user = user::Entity::find_by_id(user_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let given: Option<(i64, Option<i64>)> = review::Entity::find()
            .filter(review::Column::AuthorId.eq(user.id))
            .select_only()
            .column_as(review::Column::Id.count(), "review_count")
            .column_as(review::Column::Rating.sum(), "rating_sum")
            .into_tuple()
            .one(self.conn)
            .await?;
        let given = given
            .map(|(count, sum)| {
                RatingSummary::from_totals(u64::try_from(count).unwrap_or(0), sum.unwrap_or(0))
            })
            .unwrap_or(RatingSummary::EMPTY);

        let public_list_count = user_list::Entity::find()
            .filter(user_list::Column::OwnerId.eq(user.id))
            .filter(user_list::Column::IsPublic.eq(true))
            .count(self.conn)
            .await?;

        Ok(ProfileResponse {
            id: user.id,
            username: user.username,
            joined_at: user.created_at,
            review_count: given.total_reviews,
            average_rating_given: given.average_rating,
            public_list_count,
        })
    }
}
