use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // One review per author per entry.
    #[sea_orm(unique_key = "review_author_entry")]
    pub entry_id: i32,
    #[sea_orm(belongs_to, from = "entry_id", to = "id")]
    pub entry: HasOne<super::catalog_entry::Entity>,

    #[sea_orm(unique_key = "review_author_entry")]
    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: i32, // in half points, 0..=20

    #[sea_orm(has_many)]
    pub votes: HasMany<super::review_vote::Entity>,

    pub created_at: DateTimeUtc,
    /// NULL until the review is first edited.
    pub updated_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
