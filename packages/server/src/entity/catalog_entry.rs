use cinelog_common::ContentType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A movie, series, season, episode, actor or crew member.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub content_type: ContentType,
    /// Title for works, full name for people.
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub overview: String,
    /// Release year for works, birth year for people.
    pub year: Option<i32>,

    /// Series of a season, season of an episode.
    #[sea_orm(indexed)]
    pub parent_id: Option<i32>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
