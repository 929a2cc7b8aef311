//! User domain types.

use chrono::{DateTime, Utc};

use tabledesk_core::{Email, Role, UserId};

/// A portal user (domain type).
///
/// The password hash never leaves the repository layer; handlers and
/// services that need it ask for it explicitly.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's role.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user is an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this user is a restaurant owner.
    #[must_use]
    pub const fn is_restaurant_owner(&self) -> bool {
        self.role.is_restaurant_owner()
    }
}
