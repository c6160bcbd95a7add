use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "list_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub list_id: i32,
    #[sea_orm(primary_key)]
    pub entry_id: i32,
    #[sea_orm(belongs_to, from = "list_id", to = "id")]
    pub list: HasOne<super::user_list::Entity>,
    #[sea_orm(belongs_to, from = "entry_id", to = "id")]
    pub entry: HasOne<super::catalog_entry::Entity>,

    /// Zero-based; positions of one list are always 0..n.
    #[sea_orm(default_value = 0)]
    pub position: i32,

    pub added_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
