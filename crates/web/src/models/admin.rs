//! Admin accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use qaima_core::{AdminId, Email};

/// A stored admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: AdminId,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub email: Email,
    pub password_hash: String,
    pub name: String,
}

/// Public view of an admin, safe to return from the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminProfile {
    pub id: AdminId,
    pub email: Email,
    pub name: String,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
        }
    }
}
