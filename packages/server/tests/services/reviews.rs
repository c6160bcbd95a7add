use cinelog_common::{ContentType, Rating, VotePolarity};
use sea_orm::{DatabaseConnection, Order};

use cinelog_server::error::AppError;
use cinelog_server::models::review::{ReviewPageResponse, ReviewSort};
use cinelog_server::services::{ReviewPageParams, ReviewService, VoteService};

use crate::common::{create_entry, create_movie, create_user, review, setup};

fn params(page: Option<u64>, sort: ReviewSort, order: Order) -> ReviewPageParams {
    ReviewPageParams {
        page,
        per_page: 5,
        sort,
        order,
    }
}

async fn page(
    db: &DatabaseConnection,
    entry_id: i32,
    viewer: Option<i32>,
    params: ReviewPageParams,
) -> ReviewPageResponse {
    ReviewService::new(db)
        .page(ContentType::Movie, entry_id, viewer, params)
        .await
        .expect("review page")
}

mod aggregate {
    use super::*;

    #[tokio::test]
    async fn entry_without_reviews_averages_zero() {
        let db = setup().await;
        let movie = create_movie(&db, "Empty").await;

        let res = page(&db, movie, None, params(None, ReviewSort::CreatedAt, Order::Desc)).await;

        assert_eq!(res.total_reviews, 0);
        assert_eq!(res.average_rating, 0.0);
        assert!(res.reviews.is_empty());
        assert_eq!(res.pagination.total_pages, 0);
    }

    #[tokio::test]
    async fn average_covers_every_review_not_only_the_page() {
        let db = setup().await;
        let movie = create_movie(&db, "Popular").await;
        let ratings = [10.0, 8.0, 6.0, 4.0, 2.0, 9.5, 0.5];
        for (i, points) in ratings.iter().enumerate() {
            let author = create_user(&db, &format!("user{i}")).await;
            review(&db, movie, author, *points).await;
        }

        let res = page(&db, movie, None, params(None, ReviewSort::CreatedAt, Order::Desc)).await;

        assert_eq!(res.reviews.len(), 5);
        assert_eq!(res.total_reviews, 7);
        assert_eq!(res.pagination.total_pages, 2);
        assert!((res.average_rating - 40.0 / 7.0).abs() < 1e-9);
        assert_eq!(res.entry.rating.total_reviews, 7);
    }

    #[tokio::test]
    async fn summaries_only_contain_reviewed_entries() {
        let db = setup().await;
        let reviewed = create_movie(&db, "Reviewed").await;
        let unreviewed = create_movie(&db, "Unreviewed").await;
        let author = create_user(&db, "alice").await;
        review(&db, reviewed, author, 7.0).await;

        let map = ReviewService::new(&db)
            .summaries(&[reviewed, unreviewed])
            .await
            .expect("summaries");

        assert_eq!(map.len(), 1);
        assert_eq!(map[&reviewed].total_reviews, 1);
        assert_eq!(map[&reviewed].average_rating, 7.0);
    }
}

mod pagination {
    use super::*;

    #[tokio::test]
    async fn page_past_the_end_is_empty_but_keeps_the_aggregate() {
        let db = setup().await;
        let movie = create_movie(&db, "Short").await;
        for i in 0..3 {
            let author = create_user(&db, &format!("user{i}")).await;
            review(&db, movie, author, 5.0).await;
        }

        let res = page(
            &db,
            movie,
            None,
            params(Some(4), ReviewSort::CreatedAt, Order::Desc),
        )
        .await;

        assert!(res.reviews.is_empty());
        assert_eq!(res.total_reviews, 3);
        assert_eq!(res.average_rating, 5.0);
        assert_eq!(res.pagination.page, 4);
        assert_eq!(res.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn second_page_holds_the_remainder() {
        let db = setup().await;
        let movie = create_movie(&db, "Seven").await;
        for i in 0..7 {
            let author = create_user(&db, &format!("user{i}")).await;
            review(&db, movie, author, 5.0).await;
        }

        let res = page(
            &db,
            movie,
            None,
            params(Some(2), ReviewSort::CreatedAt, Order::Desc),
        )
        .await;

        assert_eq!(res.reviews.len(), 2);
    }
}

mod ordering {
    use super::*;

    #[tokio::test]
    async fn default_order_is_newest_first() {
        let db = setup().await;
        let movie = create_movie(&db, "Ordered").await;
        let mut ids = Vec::new();
        for i in 0..3 {
            let author = create_user(&db, &format!("user{i}")).await;
            ids.push(review(&db, movie, author, 5.0).await);
        }

        let res = page(&db, movie, None, params(None, ReviewSort::CreatedAt, Order::Desc)).await;

        let got: Vec<i32> = res.reviews.iter().map(|r| r.id).collect();
        ids.reverse();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn sorts_by_rating_ascending() {
        let db = setup().await;
        let movie = create_movie(&db, "Rated").await;
        for (i, points) in [7.0, 2.5, 9.0].iter().enumerate() {
            let author = create_user(&db, &format!("user{i}")).await;
            review(&db, movie, author, *points).await;
        }

        let res = page(&db, movie, None, params(None, ReviewSort::Rating, Order::Asc)).await;

        let got: Vec<f64> = res.reviews.iter().map(|r| r.rating).collect();
        assert_eq!(got, vec![2.5, 7.0, 9.0]);
    }

    #[tokio::test]
    async fn unedited_reviews_sort_after_edited_ones() {
        let db = setup().await;
        let movie = create_movie(&db, "Edited").await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        review(&db, movie, alice, 4.0).await;
        let edited = review(&db, movie, bob, 6.0).await;
        ReviewService::new(&db)
            .update(
                ContentType::Movie,
                movie,
                bob,
                "Changed my mind".into(),
                Rating::from_points(8.0).unwrap(),
            )
            .await
            .expect("update review");

        for order in [Order::Asc, Order::Desc] {
            let res = page(&db, movie, None, params(None, ReviewSort::UpdatedAt, order)).await;
            assert_eq!(res.reviews[0].id, edited);
            assert!(res.reviews[1].updated_at.is_none());
        }
    }
}

mod viewer {
    use super::*;

    #[tokio::test]
    async fn anonymous_viewer_sees_no_vote_or_review_flags() {
        let db = setup().await;
        let movie = create_movie(&db, "Watched").await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        let review_id = review(&db, movie, alice, 6.0).await;
        VoteService::new(&db)
            .cast(bob, ContentType::Movie, movie, review_id, VotePolarity::Up)
            .await
            .expect("vote");

        let res = page(&db, movie, None, params(None, ReviewSort::CreatedAt, Order::Desc)).await;

        assert!(!res.is_reviewed);
        let view = &res.reviews[0];
        assert_eq!(view.upvotes, 1);
        assert!(!view.is_upvoted);
        assert!(!view.is_downvoted);
    }

    #[tokio::test]
    async fn viewer_sees_own_vote_and_review_state() {
        let db = setup().await;
        let movie = create_movie(&db, "Watched").await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        let review_id = review(&db, movie, alice, 6.0).await;
        VoteService::new(&db)
            .cast(bob, ContentType::Movie, movie, review_id, VotePolarity::Down)
            .await
            .expect("vote");

        let as_bob = page(
            &db,
            movie,
            Some(bob),
            params(None, ReviewSort::CreatedAt, Order::Desc),
        )
        .await;
        assert!(!as_bob.is_reviewed);
        assert!(as_bob.reviews[0].is_downvoted);
        assert!(!as_bob.reviews[0].is_upvoted);

        let as_alice = page(
            &db,
            movie,
            Some(alice),
            params(None, ReviewSort::CreatedAt, Order::Desc),
        )
        .await;
        assert!(as_alice.is_reviewed);
        assert!(!as_alice.reviews[0].is_downvoted);
        assert_eq!(as_alice.reviews[0].author.username, "alice");
    }
}

mod authoring {
    use super::*;

    #[tokio::test]
    async fn second_review_by_the_same_author_conflicts() {
        let db = setup().await;
        let movie = create_movie(&db, "Once").await;
        let alice = create_user(&db, "alice").await;
        review(&db, movie, alice, 5.0).await;

        let res = ReviewService::new(&db)
            .submit(
                ContentType::Movie,
                movie,
                alice,
                "Again".into(),
                Rating::from_points(6.0).unwrap(),
            )
            .await;

        assert!(matches!(res, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn review_under_the_wrong_content_type_is_not_found() {
        let db = setup().await;
        let series = create_entry(&db, ContentType::Series, "Show", None).await;
        let alice = create_user(&db, "alice").await;

        let res = ReviewService::new(&db)
            .submit(
                ContentType::Movie,
                series,
                alice,
                "Hmm".into(),
                Rating::from_points(6.0).unwrap(),
            )
            .await;

        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_changes_rating_and_stamps_updated_at() {
        let db = setup().await;
        let movie = create_movie(&db, "Revisited").await;
        let alice = create_user(&db, "alice").await;
        review(&db, movie, alice, 5.0).await;

        let updated = ReviewService::new(&db)
            .update(
                ContentType::Movie,
                movie,
                alice,
                "Better on rewatch".into(),
                Rating::from_points(9.0).unwrap(),
            )
            .await
            .expect("update");

        assert_eq!(updated.rating, 18);
        assert!(updated.updated_at.is_some());
        let summary = ReviewService::new(&db).summary(movie).await.unwrap();
        assert_eq!(summary.average_rating, 9.0);
    }

    #[tokio::test]
    async fn updating_a_missing_review_is_not_found() {
        let db = setup().await;
        let movie = create_movie(&db, "Unseen").await;
        let alice = create_user(&db, "alice").await;

        let res = ReviewService::new(&db)
            .update(
                ContentType::Movie,
                movie,
                alice,
                "Never wrote one".into(),
                Rating::from_points(1.0).unwrap(),
            )
            .await;

        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn removing_a_review_drops_its_votes_and_allows_a_new_one() {
        let db = setup().await;
        let movie = create_movie(&db, "Retry").await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        let review_id = review(&db, movie, alice, 3.0).await;
        VoteService::new(&db)
            .cast(bob, ContentType::Movie, movie, review_id, VotePolarity::Up)
            .await
            .unwrap();

        ReviewService::new(&db)
            .remove(ContentType::Movie, movie, alice)
            .await
            .expect("remove");

        let summary = ReviewService::new(&db).summary(movie).await.unwrap();
        assert_eq!(summary.total_reviews, 0);
        let fresh = review(&db, movie, alice, 8.0).await;
        let res = page(&db, movie, None, params(None, ReviewSort::CreatedAt, Order::Desc)).await;
        assert_eq!(res.reviews[0].id, fresh);
        assert_eq!(res.reviews[0].upvotes, 0);
    }
}
