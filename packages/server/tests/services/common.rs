use chrono::Utc;
use cinelog_common::{ContentType, Rating};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use cinelog_server::config::DatabaseConfig;
use cinelog_server::database::init_db;
use cinelog_server::entity::user;
use cinelog_server::models::catalog::CreateEntryRequest;
use cinelog_server::services::{CatalogService, ReviewService};

/// Fresh, schema-synced in-memory database.
///
/// A single pooled connection keeps the in-memory database alive and shared.
pub async fn setup() -> DatabaseConnection {
    let mut config = DatabaseConfig::with_url("sqlite::memory:");
    config.max_connections = 1;
    config.min_connections = 1;
    init_db(&config)
        .await
        .expect("Failed to initialize in-memory database")
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> i32 {
    user::ActiveModel {
        username: Set(username.to_string()),
        password: Set("not-a-real-hash".to_string()),
        role: Set(user::DEFAULT_ROLE.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
    .id
}

pub async fn create_entry(
    db: &DatabaseConnection,
    content_type: ContentType,
    title: &str,
    parent_id: Option<i32>,
) -> i32 {
    CatalogService::new(db)
        .create(CreateEntryRequest {
            content_type,
            title: title.to_string(),
            overview: String::new(),
            year: Some(2000),
            parent_id,
        })
        .await
        .expect("Failed to create catalog entry")
        .id
}

pub async fn create_movie(db: &DatabaseConnection, title: &str) -> i32 {
    create_entry(db, ContentType::Movie, title, None).await
}

/// Submit a review with a rating given in points (0.0 - 10.0, half steps).
pub async fn review(
    db: &DatabaseConnection,
    entry_id: i32,
    author_id: i32,
    points: f64,
) -> i32 {
    let rating = Rating::from_points(points).expect("valid rating");
    ReviewService::new(db)
        .submit(
            ContentType::Movie,
            entry_id,
            author_id,
            format!("Review worth {points}"),
            rating,
        )
        .await
        .expect("Failed to submit review")
        .id
}
