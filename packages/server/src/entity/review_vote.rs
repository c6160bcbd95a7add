use cinelog_common::VotePolarity;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// At most one row per (review, voter): the polarity column holds up or down.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review_vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub review_id: i32,
    #[sea_orm(primary_key)]
    pub voter_id: i32,
    #[sea_orm(belongs_to, from = "review_id", to = "id")]
    pub review: HasOne<super::review::Entity>,
    #[sea_orm(belongs_to, from = "voter_id", to = "id")]
    pub voter: HasOne<super::user::Entity>,

    pub polarity: VotePolarity,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
