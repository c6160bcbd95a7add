use cinelog_common::ContentType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user-curated, ordered collection of catalog entries of one content type.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_list")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub content_type: ContentType,
    #[sea_orm(default_value = false)]
    pub is_public: bool,

    #[sea_orm(has_many)]
    pub items: HasMany<super::list_item::Entity>,

    #[sea_orm(has_many)]
    pub shares: HasMany<super::list_share::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
