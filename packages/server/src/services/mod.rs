//! Database-backed operations behind the HTTP handlers.
//!
//! Each service borrows a connection; mutating operations open their own
//! transaction on it and commit only when every step succeeded.

pub mod catalog;
pub mod list;
pub mod review;
pub mod user;
pub mod vote;

pub use catalog::CatalogService;
pub use list::ListService;
pub use review::{ReviewPageParams, ReviewService};
pub use user::UserService;
pub use vote::VoteService;
