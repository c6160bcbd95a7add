use cinelog_common::{ContentType, ListRole, is_contiguous};
use sea_orm::DatabaseConnection;

use cinelog_server::error::AppError;
use cinelog_server::models::list::{CreateListRequest, UpdateListRequest};
use cinelog_server::services::{CatalogService, ListService};

use crate::common::{create_entry, create_movie, create_user, setup};

async fn create_list(db: &DatabaseConnection, owner: i32, is_public: bool) -> i32 {
    ListService::new(db)
        .create(
            owner,
            CreateListRequest {
                name: "Favourites".into(),
                description: String::new(),
                content_type: ContentType::Movie,
                is_public,
            },
        )
        .await
        .expect("create list")
        .id
}

/// A private list owned by a fresh user, holding `n` movies.
async fn filled_list(db: &DatabaseConnection, n: usize) -> (i32, i32, Vec<i32>) {
    let owner = create_user(db, "owner").await;
    let list = create_list(db, owner, false).await;
    let mut movies = Vec::with_capacity(n);
    for i in 0..n {
        let movie = create_movie(db, &format!("Movie {i}")).await;
        ListService::new(db)
            .add_item(list, owner, movie)
            .await
            .expect("add item");
        movies.push(movie);
    }
    (owner, list, movies)
}

async fn order_of(db: &DatabaseConnection, list: i32, viewer: i32) -> Vec<(i32, i32)> {
    ListService::new(db)
        .get(list, Some(viewer))
        .await
        .expect("get list")
        .items
        .iter()
        .map(|i| (i.entry_id, i.position))
        .collect()
}

mod items {
    use super::*;

    #[tokio::test]
    async fn items_are_appended_with_contiguous_positions() {
        let db = setup().await;
        let (owner, list, movies) = filled_list(&db, 3).await;

        let order = order_of(&db, list, owner).await;

        assert_eq!(
            order,
            vec![(movies[0], 0), (movies[1], 1), (movies[2], 2)]
        );
    }

    #[tokio::test]
    async fn entry_of_another_content_type_is_rejected() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 0).await;
        let series = create_entry(&db, ContentType::Series, "Show", None).await;

        let res = ListService::new(&db).add_item(list, owner, series).await;

        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn adding_the_same_entry_twice_conflicts() {
        let db = setup().await;
        let (owner, list, movies) = filled_list(&db, 1).await;

        let res = ListService::new(&db).add_item(list, owner, movies[0]).await;

        assert!(matches!(res, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn removing_an_item_closes_the_gap() {
        let db = setup().await;
        let (owner, list, movies) = filled_list(&db, 4).await;

        ListService::new(&db)
            .remove_item(list, owner, movies[1])
            .await
            .expect("remove item");

        let order = order_of(&db, list, owner).await;
        assert!(is_contiguous(order.iter().map(|(_, p)| *p)));
        assert_eq!(
            order,
            vec![(movies[0], 0), (movies[2], 1), (movies[3], 2)]
        );
    }

    #[tokio::test]
    async fn removing_an_absent_item_is_not_found() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 1).await;
        let stray = create_movie(&db, "Stray").await;

        let res = ListService::new(&db).remove_item(list, owner, stray).await;

        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleting_a_catalog_entry_compacts_every_list_holding_it() {
        let db = setup().await;
        let (owner, list, movies) = filled_list(&db, 3).await;

        CatalogService::new(&db)
            .delete(ContentType::Movie, movies[0])
            .await
            .expect("delete entry");

        let order = order_of(&db, list, owner).await;
        assert_eq!(order, vec![(movies[1], 0), (movies[2], 1)]);
    }
}

mod reorder {
    use super::*;

    #[tokio::test]
    async fn applies_the_requested_permutation() {
        let db = setup().await;
        let (owner, list, m) = filled_list(&db, 3).await;

        let items = ListService::new(&db)
            .reorder(list, owner, ContentType::Movie, &[m[2], m[0], m[1]])
            .await
            .expect("reorder");

        let got: Vec<(i32, i32)> = items.iter().map(|i| (i.entry_id, i.position)).collect();
        assert_eq!(got, vec![(m[2], 0), (m[0], 1), (m[1], 2)]);
        assert_eq!(order_of(&db, list, owner).await, got);
    }

    #[tokio::test]
    async fn partial_permutation_is_a_validation_error() {
        let db = setup().await;
        let (owner, list, m) = filled_list(&db, 3).await;

        let res = ListService::new(&db)
            .reorder(list, owner, ContentType::Movie, &[m[1], m[0]])
            .await;

        assert!(matches!(res, Err(AppError::Validation(_))));
        assert_eq!(
            order_of(&db, list, owner).await,
            vec![(m[0], 0), (m[1], 1), (m[2], 2)]
        );
    }

    #[tokio::test]
    async fn duplicate_ids_are_a_validation_error() {
        let db = setup().await;
        let (owner, list, m) = filled_list(&db, 2).await;

        let res = ListService::new(&db)
            .reorder(list, owner, ContentType::Movie, &[m[0], m[0], m[1]])
            .await;

        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_entry_conflicts() {
        let db = setup().await;
        let (owner, list, m) = filled_list(&db, 2).await;
        let stray = create_movie(&db, "Stray").await;
        let before = order_of(&db, list, owner).await;

        let res = ListService::new(&db)
            .reorder(list, owner, ContentType::Movie, &[m[1], m[0], stray])
            .await;

        assert!(matches!(res, Err(AppError::Conflict(_))));
        assert_eq!(order_of(&db, list, owner).await, before);
    }

    #[tokio::test]
    async fn mismatched_content_type_is_rejected() {
        let db = setup().await;
        let (owner, list, m) = filled_list(&db, 2).await;

        let res = ListService::new(&db)
            .reorder(list, owner, ContentType::Series, &[m[1], m[0]])
            .await;

        assert!(matches!(res, Err(AppError::Validation(_))));
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn private_list_is_hidden_from_strangers() {
        let db = setup().await;
        let (_, list, _) = filled_list(&db, 1).await;
        let stranger = create_user(&db, "stranger").await;

        let as_stranger = ListService::new(&db).get(list, Some(stranger)).await;
        let anonymous = ListService::new(&db).get(list, None).await;
        let add = ListService::new(&db).add_item(list, stranger, 1).await;

        assert!(matches!(as_stranger, Err(AppError::NotFound(_))));
        assert!(matches!(anonymous, Err(AppError::NotFound(_))));
        assert!(matches!(add, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn public_list_is_readable_but_not_editable_by_strangers() {
        let db = setup().await;
        let owner = create_user(&db, "owner").await;
        let stranger = create_user(&db, "stranger").await;
        let list = create_list(&db, owner, true).await;
        let movie = create_movie(&db, "Movie").await;

        let anonymous = ListService::new(&db).get(list, None).await.expect("get");
        let add = ListService::new(&db).add_item(list, stranger, movie).await;

        assert_eq!(anonymous.role, None);
        assert!(matches!(add, Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn viewer_share_can_read_but_not_edit() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 1).await;
        let friend = create_user(&db, "friend").await;
        let movie = create_movie(&db, "Another").await;
        ListService::new(&db)
            .share(list, owner, friend, false)
            .await
            .expect("share");

        let detail = ListService::new(&db).get(list, Some(friend)).await.expect("get");
        let add = ListService::new(&db).add_item(list, friend, movie).await;

        assert_eq!(detail.role, Some(ListRole::Viewer));
        assert!(matches!(add, Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn viewer_share_cannot_reorder() {
        let db = setup().await;
        let (owner, list, m) = filled_list(&db, 3).await;
        let friend = create_user(&db, "friend").await;
        ListService::new(&db)
            .share(list, owner, friend, false)
            .await
            .expect("share");
        let before = order_of(&db, list, owner).await;

        let res = ListService::new(&db)
            .reorder(list, friend, ContentType::Movie, &[m[2], m[1], m[0]])
            .await;

        assert!(matches!(res, Err(AppError::PermissionDenied)));
        assert_eq!(order_of(&db, list, owner).await, before);
    }

    #[tokio::test]
    async fn editor_share_can_edit_but_not_delete() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 1).await;
        let friend = create_user(&db, "friend").await;
        let movie = create_movie(&db, "Another").await;
        ListService::new(&db)
            .share(list, owner, friend, true)
            .await
            .expect("share");

        let added = ListService::new(&db)
            .add_item(list, friend, movie)
            .await
            .expect("editor adds");
        let renamed = ListService::new(&db)
            .update(
                list,
                friend,
                UpdateListRequest {
                    name: Some("Shared picks".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("editor renames");
        let delete = ListService::new(&db).delete(list, friend).await;

        assert_eq!(added.position, 1);
        assert_eq!(renamed.name, "Shared picks");
        assert!(matches!(delete, Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn owner_can_delete_the_list() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 2).await;

        ListService::new(&db)
            .delete(list, owner)
            .await
            .expect("delete list");

        let res = ListService::new(&db).get(list, Some(owner)).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }
}

mod sharing {
    use super::*;

    #[tokio::test]
    async fn cannot_share_with_the_owner() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 0).await;

        let res = ListService::new(&db).share(list, owner, owner, true).await;

        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn sharing_twice_conflicts() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 0).await;
        let friend = create_user(&db, "friend").await;
        ListService::new(&db)
            .share(list, owner, friend, false)
            .await
            .unwrap();

        let res = ListService::new(&db).share(list, owner, friend, true).await;

        assert!(matches!(res, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn sharing_with_an_unknown_user_is_not_found() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 0).await;

        let res = ListService::new(&db).share(list, owner, 9999, false).await;

        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn viewer_cannot_manage_shares_but_can_leave() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 0).await;
        let friend = create_user(&db, "friend").await;
        let other = create_user(&db, "other").await;
        let service = ListService::new(&db);
        service.share(list, owner, friend, false).await.unwrap();
        service.share(list, owner, other, false).await.unwrap();

        let revoke_other = service.unshare(list, friend, other).await;
        assert!(matches!(revoke_other, Err(AppError::PermissionDenied)));

        service.unshare(list, friend, friend).await.expect("leave");
        let after = service.get(list, Some(friend)).await;
        assert!(matches!(after, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn upgrading_a_share_grants_edit_access() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 0).await;
        let friend = create_user(&db, "friend").await;
        let movie = create_movie(&db, "Later").await;
        let service = ListService::new(&db);
        service.share(list, owner, friend, false).await.unwrap();

        let share = service
            .update_share(list, owner, friend, true)
            .await
            .expect("update share");
        assert_eq!(share.username, "friend");

        service
            .add_item(list, friend, movie)
            .await
            .expect("upgraded share can add");
    }

    #[tokio::test]
    async fn share_listing_and_my_lists_reflect_shares() {
        let db = setup().await;
        let (owner, list, _) = filled_list(&db, 2).await;
        let friend = create_user(&db, "friend").await;
        let service = ListService::new(&db);
        service.share(list, owner, friend, true).await.unwrap();
        create_list(&db, friend, false).await;

        let shares = service.shares(list, owner).await.expect("shares");
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].user_id, friend);

        let mine = service.for_user(friend).await.expect("my lists");
        assert_eq!(mine.owned.len(), 1);
        assert_eq!(mine.shared_with_me.len(), 1);
        assert_eq!(mine.shared_with_me[0].id, list);
        assert_eq!(mine.shared_with_me[0].item_count, 2);
    }
}
