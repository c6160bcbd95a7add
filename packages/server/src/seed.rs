use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use tracing::{info, warn};

use crate::config::BootstrapAdmin;
use crate::entity::{list_item, review, user};
use crate::utils::{hash, permission};

/// Create the configured admin account unless a user with that name exists.
///
/// An existing account is left untouched, including its role and password.
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    admin: &BootstrapAdmin,
) -> Result<(), DbErr> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(admin.username.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password = hash::hash_password(&admin.password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;
    user::ActiveModel {
        username: Set(admin.username.clone()),
        password: Set(password),
        role: Set(permission::ADMIN_ROLE.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(username = %admin.username, "Created bootstrap admin");
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Review page: WHERE entry_id = ? ORDER BY created_at
    create_index(
        db,
        "idx_review_entry_created",
        Index::create()
            .if_not_exists()
            .name("idx_review_entry_created")
            .table(review::Entity)
            .col(review::Column::EntryId)
            .col(review::Column::CreatedAt)
            .to_owned(),
    )
    .await;

    // List items in display order
    create_index(
        db,
        "idx_list_item_list_position",
        Index::create()
            .if_not_exists()
            .name("idx_list_item_list_position")
            .table(list_item::Entity)
            .col(list_item::Column::ListId)
            .col(list_item::Column::Position)
            .to_owned(),
    )
    .await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: IndexCreateStatement) {
    let stmt = db.get_database_backend().build(&stmt);
    match db.execute_unprepared(&stmt.sql).await {
        Ok(_) => info!("Ensured index {name} exists"),
        Err(e) => warn!("Failed to create index {name}: {e}"),
    }
}
