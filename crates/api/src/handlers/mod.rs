pub mod admin;
pub mod articles;
pub mod auth;
pub mod groups;
pub mod search;
