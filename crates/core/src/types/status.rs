//! Role, lifecycle status, and plan enums.
//!
//! These are closed tagged variants: authorization and lifecycle logic match
//! on them exhaustively instead of comparing strings at call sites. Database
//! columns store the lowercase string form; repositories parse with
//! [`std::str::FromStr`] when loading rows.

use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Reviews, approves, and suspends restaurant registrations.
    Admin,
    /// Registers and manages exactly one restaurant.
    RestaurantOwner,
}

impl Role {
    /// Whether this role is [`Role::Admin`].
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role is [`Role::RestaurantOwner`].
    #[must_use]
    pub const fn is_restaurant_owner(self) -> bool {
        matches!(self, Self::RestaurantOwner)
    }

    /// The lowercase string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::RestaurantOwner => "restaurant_owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "restaurant_owner" => Ok(Self::RestaurantOwner),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Restaurant moderation lifecycle status.
///
/// Owner-created restaurants always start `Pending`; only admins move a
/// restaurant between states afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantStatus {
    /// Awaiting admin review.
    #[default]
    Pending,
    /// Approved and visible.
    Approved,
    /// Suspended by an admin.
    Suspended,
}

impl RestaurantStatus {
    /// The lowercase string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RestaurantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("invalid restaurant status: {s}")),
        }
    }
}

/// Restaurant subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Paid,
}

impl Plan {
    /// The lowercase string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("invalid plan: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicates() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Admin.is_restaurant_owner());
        assert!(Role::RestaurantOwner.is_restaurant_owner());
        assert!(!Role::RestaurantOwner.is_admin());
    }

    #[test]
    fn test_role_string_roundtrip() {
        for role in [Role::Admin, Role::RestaurantOwner] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            RestaurantStatus::Pending,
            RestaurantStatus::Approved,
            RestaurantStatus::Suspended,
        ] {
            assert_eq!(
                status.as_str().parse::<RestaurantStatus>().unwrap(),
                status
            );
        }
        assert!("deleted".parse::<RestaurantStatus>().is_err());
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(RestaurantStatus::default(), RestaurantStatus::Pending);
    }

    #[test]
    fn test_plan_string_roundtrip() {
        for plan in [Plan::Free, Plan::Paid] {
            assert_eq!(plan.as_str().parse::<Plan>().unwrap(), plan);
        }
        assert!("enterprise".parse::<Plan>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::RestaurantOwner).unwrap(),
            "\"restaurant_owner\""
        );
        assert_eq!(
            serde_json::to_string(&RestaurantStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
