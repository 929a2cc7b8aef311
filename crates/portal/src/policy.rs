//! Authorization policy for restaurant access and lifecycle control.
//!
//! Every decision takes the acting user explicitly; nothing here reads
//! request-global state. Denials are redirect-style rejections carrying a
//! user-visible message and a safe redirect target, never raw errors:
//! handlers turn them into a flash + redirect.
//!
//! Rules:
//!
//! - listing, approve, and suspend are admin-only (enforced by the
//!   `RequireAdmin` extractor before a handler runs);
//! - show/edit/update/destroy require admin or the owning user;
//! - a restaurant owner who already owns a restaurant may not register a
//!   second one;
//! - a submitted status is honored only for admins - forced to `Pending` on
//!   owner create, silently dropped on owner update.

use tabledesk_core::{RestaurantStatus, Role};

use crate::models::{CurrentUser, Restaurant};

/// Per-restaurant actions governed by [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantAction {
    Show,
    Edit,
    Update,
    Destroy,
}

/// A redirect-style authorization rejection.
///
/// Carries the notice shown to the user and the page to send them to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// User-visible permission notice.
    pub message: &'static str,
    /// Deterministic redirect target.
    pub redirect_to: String,
}

/// Decide whether `actor` may perform `action` on `restaurant`.
///
/// Permitted iff the actor is an admin or the restaurant's owning user.
///
/// # Errors
///
/// Returns a [`Denial`] redirecting to the home page otherwise.
pub fn authorize(
    actor: &CurrentUser,
    restaurant: &Restaurant,
    action: RestaurantAction,
) -> Result<(), Denial> {
    let permitted = match actor.role {
        Role::Admin => true,
        Role::RestaurantOwner => restaurant.owner_user_id == actor.id,
    };

    if permitted {
        Ok(())
    } else {
        tracing::warn!(
            actor_id = %actor.id,
            restaurant_id = %restaurant.id,
            ?action,
            "restaurant access denied"
        );
        Err(Denial {
            message: "You don't have permission to access this restaurant.",
            redirect_to: "/".to_owned(),
        })
    }
}

/// Decide whether `actor` may register a new restaurant.
///
/// `existing` is the actor's current restaurant, if any. Admins register on
/// behalf of other users and are never blocked here; an owner who already
/// has a restaurant is redirected to it.
///
/// This check is a UX fast path: the unique index on
/// `restaurants.owner_user_id` remains the authoritative guard under
/// concurrent requests.
///
/// # Errors
///
/// Returns a [`Denial`] redirecting to the actor's own restaurant page.
pub fn authorize_registration(
    actor: &CurrentUser,
    existing: Option<&Restaurant>,
) -> Result<(), Denial> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::RestaurantOwner => match existing {
            None => Ok(()),
            Some(restaurant) => Err(Denial {
                message: "You already have a restaurant registered.",
                redirect_to: format!("/restaurants/{}", restaurant.id),
            }),
        },
    }
}

/// Resolve the status a newly created restaurant lands in.
///
/// Non-admin creations are forced to `Pending` regardless of any submitted
/// value. Admin creations honor the submitted status, defaulting to
/// `Approved`.
#[must_use]
pub const fn resolve_new_status(
    role: Role,
    submitted: Option<RestaurantStatus>,
) -> RestaurantStatus {
    match role {
        Role::Admin => match submitted {
            Some(status) => status,
            None => RestaurantStatus::Approved,
        },
        Role::RestaurantOwner => RestaurantStatus::Pending,
    }
}

/// Resolve the status an update persists.
///
/// A non-admin's submitted status is silently dropped (owners cannot
/// self-approve); an admin's is honored.
#[must_use]
pub const fn resolve_update_status(
    role: Role,
    submitted: Option<RestaurantStatus>,
    current: RestaurantStatus,
) -> RestaurantStatus {
    match role {
        Role::Admin => match submitted {
            Some(status) => status,
            None => current,
        },
        Role::RestaurantOwner => current,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tabledesk_core::{Email, Plan, RestaurantId, UserId};

    fn actor(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            role,
        }
    }

    fn restaurant(owner_id: i32) -> Restaurant {
        Restaurant {
            id: RestaurantId::new(10),
            name: "Blue Fig".to_owned(),
            owner_name: "Dana Halabi".to_owned(),
            email: Email::parse("hello@bluefig.example.com").unwrap(),
            phone: "5550100199".to_owned(),
            address: "12 Harbour Street, Portsmouth".to_owned(),
            plan: Plan::Free,
            status: RestaurantStatus::Pending,
            owner_user_id: UserId::new(owner_id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    const ALL_ACTIONS: [RestaurantAction; 4] = [
        RestaurantAction::Show,
        RestaurantAction::Edit,
        RestaurantAction::Update,
        RestaurantAction::Destroy,
    ];

    #[test]
    fn test_admin_may_do_anything() {
        let admin = actor(1, Role::Admin);
        let other = restaurant(99);
        for action in ALL_ACTIONS {
            assert!(authorize(&admin, &other, action).is_ok());
        }
    }

    #[test]
    fn test_owner_may_manage_own_restaurant() {
        let owner = actor(5, Role::RestaurantOwner);
        let own = restaurant(5);
        for action in ALL_ACTIONS {
            assert!(authorize(&owner, &own, action).is_ok());
        }
    }

    #[test]
    fn test_owner_denied_on_foreign_restaurant() {
        let owner = actor(5, Role::RestaurantOwner);
        let foreign = restaurant(6);
        for action in ALL_ACTIONS {
            let denial = authorize(&owner, &foreign, action).unwrap_err();
            assert_eq!(denial.redirect_to, "/");
            assert!(denial.message.contains("permission"));
        }
    }

    #[test]
    fn test_registration_open_to_new_owner() {
        let owner = actor(5, Role::RestaurantOwner);
        assert!(authorize_registration(&owner, None).is_ok());
    }

    #[test]
    fn test_registration_denied_for_existing_owner() {
        let owner = actor(5, Role::RestaurantOwner);
        let own = restaurant(5);
        let denial = authorize_registration(&owner, Some(&own)).unwrap_err();
        assert_eq!(denial.redirect_to, "/restaurants/10");
        assert_eq!(denial.message, "You already have a restaurant registered.");
    }

    #[test]
    fn test_registration_never_blocks_admin() {
        let admin = actor(1, Role::Admin);
        let own = restaurant(1);
        assert!(authorize_registration(&admin, Some(&own)).is_ok());
    }

    #[test]
    fn test_owner_create_always_pending() {
        for submitted in [
            None,
            Some(RestaurantStatus::Approved),
            Some(RestaurantStatus::Suspended),
            Some(RestaurantStatus::Pending),
        ] {
            assert_eq!(
                resolve_new_status(Role::RestaurantOwner, submitted),
                RestaurantStatus::Pending
            );
        }
    }

    #[test]
    fn test_admin_create_defaults_to_approved() {
        assert_eq!(
            resolve_new_status(Role::Admin, None),
            RestaurantStatus::Approved
        );
        assert_eq!(
            resolve_new_status(Role::Admin, Some(RestaurantStatus::Pending)),
            RestaurantStatus::Pending
        );
    }

    #[test]
    fn test_owner_update_keeps_current_status() {
        for current in [
            RestaurantStatus::Pending,
            RestaurantStatus::Approved,
            RestaurantStatus::Suspended,
        ] {
            assert_eq!(
                resolve_update_status(
                    Role::RestaurantOwner,
                    Some(RestaurantStatus::Approved),
                    current
                ),
                current
            );
        }
    }

    #[test]
    fn test_admin_update_honors_submitted_status() {
        assert_eq!(
            resolve_update_status(
                Role::Admin,
                Some(RestaurantStatus::Suspended),
                RestaurantStatus::Approved
            ),
            RestaurantStatus::Suspended
        );
        assert_eq!(
            resolve_update_status(Role::Admin, None, RestaurantStatus::Approved),
            RestaurantStatus::Approved
        );
    }
}
