use cinelog_common::{ContentType, VotePolarity};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use cinelog_server::entity::review_vote;
use cinelog_server::error::AppError;
use cinelog_server::models::review::VoteResponse;
use cinelog_server::services::{ReviewService, VoteService};

use crate::common::{create_movie, create_user, review, setup};

async fn cast(
    db: &DatabaseConnection,
    voter: i32,
    entry: i32,
    review_id: i32,
    polarity: VotePolarity,
) -> VoteResponse {
    VoteService::new(db)
        .cast(voter, ContentType::Movie, entry, review_id, polarity)
        .await
        .expect("cast vote")
}

/// A movie with one review by `author`, plus a `voter` account.
async fn reviewed_movie(db: &DatabaseConnection) -> (i32, i32, i32) {
    let movie = create_movie(db, "Voted").await;
    let author = create_user(db, "author").await;
    let voter = create_user(db, "voter").await;
    let review_id = review(db, movie, author, 7.0).await;
    (movie, review_id, voter)
}

#[tokio::test]
async fn first_upvote_is_recorded() {
    let db = setup().await;
    let (movie, review_id, voter) = reviewed_movie(&db).await;

    let res = cast(&db, voter, movie, review_id, VotePolarity::Up).await;

    assert!(res.is_upvoted);
    assert!(!res.is_downvoted);
    assert_eq!((res.upvotes, res.downvotes), (1, 0));
}

#[tokio::test]
async fn repeating_a_vote_retracts_it() {
    let db = setup().await;
    let (movie, review_id, voter) = reviewed_movie(&db).await;

    cast(&db, voter, movie, review_id, VotePolarity::Down).await;
    let res = cast(&db, voter, movie, review_id, VotePolarity::Down).await;

    assert!(!res.is_upvoted);
    assert!(!res.is_downvoted);
    assert_eq!((res.upvotes, res.downvotes), (0, 0));
}

#[tokio::test]
async fn opposite_vote_switches_instead_of_adding() {
    let db = setup().await;
    let (movie, review_id, voter) = reviewed_movie(&db).await;

    cast(&db, voter, movie, review_id, VotePolarity::Up).await;
    let res = cast(&db, voter, movie, review_id, VotePolarity::Down).await;

    assert!(!res.is_upvoted);
    assert!(res.is_downvoted);
    assert_eq!((res.upvotes, res.downvotes), (0, 1));
}

async fn stored_votes(db: &DatabaseConnection, voter: i32) -> u64 {
    review_vote::Entity::find()
        .filter(review_vote::Column::VoterId.eq(voter))
        .count(db)
        .await
        .expect("count votes")
}

#[tokio::test]
async fn switching_keeps_a_single_row_and_its_vote_time() {
    let db = setup().await;
    let (movie, review_id, voter) = reviewed_movie(&db).await;

    let down = cast(&db, voter, movie, review_id, VotePolarity::Down).await;
    assert_eq!(stored_votes(&db, voter).await, 1);
    assert_eq!(down.score, -1);
    let first = review_vote::Entity::find_by_id((review_id, voter))
        .one(&db)
        .await
        .unwrap()
        .expect("vote row");

    let up = cast(&db, voter, movie, review_id, VotePolarity::Up).await;
    let switched = review_vote::Entity::find_by_id((review_id, voter))
        .one(&db)
        .await
        .unwrap()
        .expect("vote row");

    assert_eq!(stored_votes(&db, voter).await, 1);
    assert_eq!(switched.polarity, VotePolarity::Up);
    assert_eq!(switched.created_at, first.created_at);
    assert!(up.is_upvoted && !up.is_downvoted);
    assert_eq!(up.score, 1);
}

#[tokio::test]
async fn votes_from_different_users_are_tallied_separately() {
    let db = setup().await;
    let (movie, review_id, voter) = reviewed_movie(&db).await;
    let other = create_user(&db, "other").await;
    let third = create_user(&db, "third").await;

    cast(&db, voter, movie, review_id, VotePolarity::Up).await;
    cast(&db, other, movie, review_id, VotePolarity::Up).await;
    let res = cast(&db, third, movie, review_id, VotePolarity::Down).await;

    assert!(res.is_downvoted);
    assert_eq!((res.upvotes, res.downvotes), (2, 1));
}

#[tokio::test]
async fn voting_on_a_review_of_another_entry_is_not_found() {
    let db = setup().await;
    let (_, review_id, voter) = reviewed_movie(&db).await;
    let elsewhere = create_movie(&db, "Elsewhere").await;

    let res = VoteService::new(&db)
        .cast(voter, ContentType::Movie, elsewhere, review_id, VotePolarity::Up)
        .await;

    assert!(matches!(res, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn voting_on_a_missing_review_is_not_found() {
    let db = setup().await;
    let (movie, review_id, voter) = reviewed_movie(&db).await;

    let res = VoteService::new(&db)
        .cast(voter, ContentType::Movie, movie, review_id + 100, VotePolarity::Up)
        .await;

    assert!(matches!(res, Err(AppError::NotFound(_))));
}

mod voters {
    use super::*;

    #[tokio::test]
    async fn lists_voters_of_one_polarity_in_vote_order() {
        let db = setup().await;
        let (movie, review_id, voter) = reviewed_movie(&db).await;
        let other = create_user(&db, "other").await;
        let hater = create_user(&db, "hater").await;
        cast(&db, voter, movie, review_id, VotePolarity::Up).await;
        cast(&db, other, movie, review_id, VotePolarity::Up).await;
        cast(&db, hater, movie, review_id, VotePolarity::Down).await;

        let res = ReviewService::new(&db)
            .voters(ContentType::Movie, movie, review_id, VotePolarity::Up, None, 20)
            .await
            .expect("voters");

        let names: Vec<&str> = res.data.iter().map(|v| v.username.as_str()).collect();
        assert_eq!(names, vec!["voter", "other"]);
        assert_eq!(res.pagination.total, 2);

        let down = ReviewService::new(&db)
            .voters(ContentType::Movie, movie, review_id, VotePolarity::Down, None, 20)
            .await
            .expect("voters");
        assert_eq!(down.data.len(), 1);
        assert_eq!(down.data[0].user_id, hater);
    }

    #[tokio::test]
    async fn retracted_votes_leave_the_voter_list() {
        let db = setup().await;
        let (movie, review_id, voter) = reviewed_movie(&db).await;
        cast(&db, voter, movie, review_id, VotePolarity::Up).await;
        cast(&db, voter, movie, review_id, VotePolarity::Up).await;

        let res = ReviewService::new(&db)
            .voters(ContentType::Movie, movie, review_id, VotePolarity::Up, None, 20)
            .await
            .expect("voters");

        assert!(res.data.is_empty());
        assert_eq!(res.pagination.total, 0);
    }

    #[tokio::test]
    async fn voter_pages_past_the_end_are_empty() {
        let db = setup().await;
        let (movie, review_id, voter) = reviewed_movie(&db).await;
        cast(&db, voter, movie, review_id, VotePolarity::Up).await;

        let res = ReviewService::new(&db)
            .voters(ContentType::Movie, movie, review_id, VotePolarity::Up, Some(3), 1)
            .await
            .expect("voters");

        assert!(res.data.is_empty());
        assert_eq!(res.pagination.total, 1);
    }
}
