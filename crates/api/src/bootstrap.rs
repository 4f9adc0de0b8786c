//! First-boot admin account.
//!
//! Registration only ever creates readers, so a fresh deployment needs one
//! admin to promote everyone else. When `BOOTSTRAP_ADMIN_EMAIL` and
//! `BOOTSTRAP_ADMIN_PASSWORD` are set and no account with that email exists,
//! it is created with the `admin` role. An existing account is left alone.

use wikisearch_core::error::CoreError;
use wikisearch_core::roles::Role;
use wikisearch_db::models::user::CreateUser;
use wikisearch_db::repositories::{RoleRepo, UserRepo};
use wikisearch_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the bootstrap admin if missing. Returns `true` when an account
/// was created.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    let email = admin.email.trim().to_lowercase();
    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!("Bootstrap admin already exists");
        return Ok(false);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let role_id = RoleRepo::id_of(pool, Role::Admin)
        .await?
        .ok_or_else(|| AppError::InternalError("Admin role is not seeded".into()))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email,
            password_hash,
            role_id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Bootstrap admin created");
    Ok(true)
}
