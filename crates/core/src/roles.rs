//! Well-known roles and the capabilities they grant.
//!
//! Role names must match the seed data in `db/migrations/*_create_roles_and_users.sql`.
//! Authorization is a flat capability lookup: roles do not inherit from each
//! other, each one lists exactly what it may do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_AUTHOR: &str = "author";
pub const ROLE_READER: &str = "reader";

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: Role = Role::Reader;

/// An account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Author,
    Reader,
}

/// An operation gated at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read articles, revisions and search.
    Read,
    /// Create and edit articles, delete own articles.
    Write,
    /// Delete or restore articles owned by someone else.
    Moderate,
    /// Manage users and the search index.
    Administer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Author, Role::Reader];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Author => ROLE_AUTHOR,
            Self::Reader => ROLE_READER,
        }
    }

    /// Whether this role grants `capability`.
    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Self::Admin => true,
            Self::Author => matches!(capability, Capability::Read | Capability::Write),
            Self::Reader => matches!(capability, Capability::Read),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_AUTHOR => Ok(Self::Author),
            ROLE_READER => Ok(Self::Reader),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}'. Valid roles: {ROLE_ADMIN}, {ROLE_AUTHOR}, {ROLE_READER}"
            ))),
        }
    }
}
