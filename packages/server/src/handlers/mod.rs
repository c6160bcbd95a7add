pub mod auth;
pub mod catalog;
pub mod list;
pub mod review;
pub mod user;
pub mod vote;
