use cinelog_common::ContentType;

use cinelog_server::error::AppError;
use cinelog_server::models::list::CreateListRequest;
use cinelog_server::services::{ListService, UserService};

use crate::common::{create_movie, create_user, review, setup};

#[tokio::test]
async fn profile_counts_reviews_and_public_lists() {
    let db = setup().await;
    let alice = create_user(&db, "alice").await;
    let first = create_movie(&db, "First").await;
    let second = create_movie(&db, "Second").await;
    review(&db, first, alice, 6.0).await;
    review(&db, second, alice, 9.0).await;
    for is_public in [true, false, true] {
        ListService::new(&db)
            .create(
                alice,
                CreateListRequest {
                    name: "List".into(),
                    description: String::new(),
                    content_type: ContentType::Movie,
                    is_public,
                },
            )
            .await
            .unwrap();
    }

    let profile = UserService::new(&db).profile(alice).await.expect("profile");

    assert_eq!(profile.username, "alice");
    assert_eq!(profile.review_count, 2);
    assert_eq!(profile.average_rating_given, 7.5);
    assert_eq!(profile.public_list_count, 2);
}

#[tokio::test]
async fn new_user_profile_is_empty() {
    let db = setup().await;
    let bob = create_user(&db, "bob").await;

    let profile = UserService::new(&db).profile(bob).await.expect("profile");

    assert_eq!(profile.review_count, 0);
    assert_eq!(profile.average_rating_given, 0.0);
    assert_eq!(profile.public_list_count, 0);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let db = setup().await;

    let res = UserService::new(&db).profile(42).await;

    assert!(matches!(res, Err(AppError::NotFound(_))));
}
