//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod article_repo;
pub mod embedding_repo;
pub mod group_repo;
pub mod revision_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use article_repo::ArticleRepo;
pub use embedding_repo::EmbeddingRepo;
pub use group_repo::GroupRepo;
pub use revision_repo::RevisionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
