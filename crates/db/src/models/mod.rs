pub mod article;
pub mod embedding;
pub mod group;
pub mod revision;
pub mod role;
pub mod session;
pub mod user;
