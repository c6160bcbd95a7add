pub mod auth;
pub mod catalog;
pub mod list;
pub mod review;
pub mod shared;
pub mod user;
