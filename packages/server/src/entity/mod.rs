pub mod catalog_entry;
pub mod list_item;
pub mod list_share;
pub mod review;
pub mod review_vote;
pub mod user;
pub mod user_list;
