//! Session-related types for authentication.
//!
//! Types stored in the session to identify the logged-in user. The session
//! identity is the explicit actor threaded through every authorization and
//! lifecycle call; there is no ambient request-global current user.

use serde::{Deserialize, Serialize};

use tabledesk_core::{Email, Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's role.
    pub role: Role,
}

impl CurrentUser {
    /// Whether the actor is an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the actor is a restaurant owner.
    #[must_use]
    pub const fn is_restaurant_owner(&self) -> bool {
        self.role.is_restaurant_owner()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
