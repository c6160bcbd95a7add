use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, catalog, list, review, user, vote};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/catalog", catalog_routes())
        .nest("/users", user_routes())
        .nest("/lists", list_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn catalog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(catalog::list_entries, catalog::create_entry))
        .routes(routes!(
            catalog::get_entry,
            catalog::update_entry,
            catalog::delete_entry
        ))
        .nest("/{content_type}/{id}/reviews", review_routes())
}

fn review_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            review::get_review_page,
            review::submit_review,
            review::update_review,
            review::remove_review
        ))
        .routes(routes!(vote::cast_upvote))
        .routes(routes!(vote::cast_downvote))
        .routes(routes!(review::list_voters))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(user::get_profile))
}

fn list_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list::my_lists, list::create_list))
        .routes(routes!(list::get_list, list::update_list, list::delete_list))
        .routes(routes!(list::add_item))
        .routes(routes!(list::reorder_items))
        .routes(routes!(list::remove_item))
        .routes(routes!(list::list_shares, list::share_list))
        .routes(routes!(list::update_share, list::unshare_list))
}
