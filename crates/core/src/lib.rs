//! Domain logic shared by every wikisearch crate.
//!
//! Nothing in here performs I/O: the store, the embedding provider and the
//! vector index live in their own crates and feed plain values into the
//! functions below.

pub mod article;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod roles;
pub mod search;
pub mod types;
