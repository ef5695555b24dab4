//! User domain type.

use chrono::{DateTime, Utc};

use grocery_core::{UserId, Username};

/// A registered user.
///
/// The password hash is deliberately absent; only the auth service reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across users.
    pub username: Username,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
