//! Restaurant lifecycle service.
//!
//! Registration, moderation, and profile updates. Every entry point takes
//! the acting user explicitly and runs the authorization policy before
//! touching the database; status resolution goes through the policy layer so
//! a submitted status can never leak past an actor's role.

use sqlx::PgPool;
use thiserror::Error;

use tabledesk_core::{RestaurantId, RestaurantStatus, Role, UserId};

use crate::db::{
    RepositoryError,
    restaurants::{RestaurantRepository, StatusCounts},
    users::UserRepository,
};
use crate::models::{CurrentUser, Restaurant, RestaurantForm, User};
use crate::policy::{self, Denial, RestaurantAction};
use crate::services::auth::{self, AuthError};

/// Failure modes of owner self-registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Form fields failed validation; messages for re-render.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// The policy rejected the registration.
    #[error("{}", .0.message)]
    Denied(Denial),

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failure modes of the admin registration pipeline.
///
/// Validation failures keep restaurant-field and owner-account messages
/// separate so the form can render each list next to its section.
#[derive(Debug, Error)]
pub enum AdminCreateError {
    /// One or both sections of the form failed validation.
    #[error("validation failed")]
    Validation {
        restaurant_errors: Vec<String>,
        owner_errors: Vec<String>,
    },

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failure modes of a profile update.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// No restaurant with that ID.
    #[error("restaurant not found")]
    NotFound,

    /// The policy rejected the update.
    #[error("{}", .0.message)]
    Denied(Denial),

    /// Form fields failed validation; messages for re-render.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failure modes of read/destroy access to a single restaurant.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No restaurant with that ID.
    #[error("restaurant not found")]
    NotFound,

    /// The policy rejected the access.
    #[error("{}", .0.message)]
    Denied(Denial),

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Restaurant lifecycle service.
pub struct RestaurantService<'a> {
    pool: &'a PgPool,
    restaurants: RestaurantRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> RestaurantService<'a> {
    /// Create a new restaurant service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            restaurants: RestaurantRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// All restaurants with per-status counts, for the admin listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if either query fails.
    pub async fn list_with_counts(
        &self,
    ) -> Result<(Vec<Restaurant>, StatusCounts), RepositoryError> {
        let restaurants = self.restaurants.list_all().await?;
        let counts = self.restaurants.status_counts().await?;
        Ok((restaurants, counts))
    }

    /// The actor's own restaurant, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn owned_by(&self, user_id: UserId) -> Result<Option<Restaurant>, RepositoryError> {
        self.restaurants.get_by_owner(user_id).await
    }

    /// Restaurant-owner users with no restaurant yet, for the admin form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn unassigned_owners(&self) -> Result<Vec<User>, RepositoryError> {
        self.users.list_unassigned_owners().await
    }

    /// Fetch a restaurant and authorize `actor` for `action` on it.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` for unknown IDs and
    /// `AccessError::Denied` when the policy rejects the actor.
    pub async fn get_for(
        &self,
        actor: &CurrentUser,
        id: RestaurantId,
        action: RestaurantAction,
    ) -> Result<Restaurant, AccessError> {
        let restaurant = self
            .restaurants
            .get_by_id(id)
            .await?
            .ok_or(AccessError::NotFound)?;
        policy::authorize(actor, &restaurant, action).map_err(AccessError::Denied)?;
        Ok(restaurant)
    }

    /// Register a restaurant for the acting owner.
    ///
    /// The new restaurant always lands in `Pending` regardless of any
    /// submitted status.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Denied` when the actor already owns a
    /// restaurant, `RegistrationError::Validation` on bad form fields.
    pub async fn owner_create(
        &self,
        actor: &CurrentUser,
        form: &RestaurantForm,
    ) -> Result<Restaurant, RegistrationError> {
        let existing = self.restaurants.get_by_owner(actor.id).await?;
        policy::authorize_registration(actor, existing.as_ref())
            .map_err(RegistrationError::Denied)?;

        let profile = form.validate().map_err(RegistrationError::Validation)?;
        let status = policy::resolve_new_status(actor.role, None);

        let restaurant = self
            .restaurants
            .create(actor.id, &profile, status)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => RegistrationError::Validation(vec![message]),
                other => RegistrationError::Repository(other),
            })?;

        tracing::info!(
            restaurant_id = %restaurant.id,
            owner_user_id = %actor.id,
            "restaurant registered, awaiting review"
        );
        Ok(restaurant)
    }

    /// Register a restaurant on behalf of an owner, as an admin.
    ///
    /// The whole pipeline runs in one transaction: resolve (or create) the
    /// owner account, check they don't already have a restaurant, then insert
    /// the restaurant with the admin's resolved status (default `Approved`).
    /// Any step failing rolls the transaction back and reports field errors
    /// for the form section that caused it.
    ///
    /// # Errors
    ///
    /// Returns `AdminCreateError::Validation` with per-section messages, or
    /// `AdminCreateError::Repository` for unexpected database errors.
    pub async fn admin_create(
        &self,
        actor: &CurrentUser,
        form: &RestaurantForm,
    ) -> Result<Restaurant, AdminCreateError> {
        debug_assert!(actor.is_admin());

        let mut restaurant_errors = Vec::new();
        let profile = match form.validate() {
            Ok(profile) => Some(profile),
            Err(errors) => {
                restaurant_errors = errors;
                None
            }
        };
        let submitted = match form.submitted_status() {
            Ok(submitted) => submitted,
            Err(message) => {
                restaurant_errors.push(message);
                None
            }
        };

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let owner = match resolve_owner(&mut tx, form).await? {
            Ok(owner) => owner,
            Err(owner_errors) => {
                return Err(AdminCreateError::Validation {
                    restaurant_errors,
                    owner_errors,
                });
            }
        };

        // Dropping the open transaction here rolls back any inline-created
        // owner account.
        let profile = match profile {
            Some(profile) if restaurant_errors.is_empty() => profile,
            _ => {
                return Err(AdminCreateError::Validation {
                    restaurant_errors,
                    owner_errors: Vec::new(),
                });
            }
        };

        let status = policy::resolve_new_status(Role::Admin, submitted);
        let restaurant =
            RestaurantRepository::create_in(&mut tx, owner.id, &profile, status)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(message) => AdminCreateError::Validation {
                        restaurant_errors: vec![message],
                        owner_errors: Vec::new(),
                    },
                    other => AdminCreateError::Repository(other),
                })?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            restaurant_id = %restaurant.id,
            owner_user_id = %owner.id,
            admin_id = %actor.id,
            status = %status,
            "restaurant registered by admin"
        );
        Ok(restaurant)
    }

    /// Update a restaurant's profile.
    ///
    /// A non-admin's submitted status is dropped; an admin's is honored.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::NotFound`, `UpdateError::Denied`, or
    /// `UpdateError::Validation` per the failing step.
    pub async fn update(
        &self,
        actor: &CurrentUser,
        id: RestaurantId,
        form: &RestaurantForm,
    ) -> Result<Restaurant, UpdateError> {
        let restaurant = self
            .restaurants
            .get_by_id(id)
            .await?
            .ok_or(UpdateError::NotFound)?;
        policy::authorize(actor, &restaurant, RestaurantAction::Update)
            .map_err(UpdateError::Denied)?;

        let profile = form.validate().map_err(UpdateError::Validation)?;

        // Only admins can change status, so a bad value from anyone else is
        // dropped along with the rest of the status parameter.
        let submitted = if actor.is_admin() {
            form.submitted_status()
                .map_err(|message| UpdateError::Validation(vec![message]))?
        } else {
            None
        };
        let status = policy::resolve_update_status(actor.role, submitted, restaurant.status);

        let updated = self
            .restaurants
            .update(id, &profile, status)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => UpdateError::Validation(vec![message]),
                RepositoryError::NotFound => UpdateError::NotFound,
                other => UpdateError::Repository(other),
            })?;

        Ok(updated)
    }

    /// Approve a restaurant (admin moderation action).
    ///
    /// Unconditional: approving an already approved restaurant is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown IDs.
    pub async fn approve(
        &self,
        actor: &CurrentUser,
        id: RestaurantId,
    ) -> Result<(), RepositoryError> {
        self.restaurants
            .set_status(id, RestaurantStatus::Approved)
            .await?;
        tracing::info!(restaurant_id = %id, admin_id = %actor.id, "restaurant approved");
        Ok(())
    }

    /// Suspend a restaurant (admin moderation action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown IDs.
    pub async fn suspend(
        &self,
        actor: &CurrentUser,
        id: RestaurantId,
    ) -> Result<(), RepositoryError> {
        self.restaurants
            .set_status(id, RestaurantStatus::Suspended)
            .await?;
        tracing::info!(restaurant_id = %id, admin_id = %actor.id, "restaurant suspended");
        Ok(())
    }

    /// Delete a restaurant after authorizing the actor.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` or `AccessError::Denied` per the
    /// failing step.
    pub async fn destroy(&self, actor: &CurrentUser, id: RestaurantId) -> Result<(), AccessError> {
        let restaurant = self
            .restaurants
            .get_by_id(id)
            .await?
            .ok_or(AccessError::NotFound)?;
        policy::authorize(actor, &restaurant, RestaurantAction::Destroy)
            .map_err(AccessError::Denied)?;

        self.restaurants.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AccessError::NotFound,
            other => AccessError::Repository(other),
        })?;

        tracing::info!(restaurant_id = %id, actor_id = %actor.id, "restaurant deleted");
        Ok(())
    }
}

/// Resolve the owner account for an admin registration, inside the caller's
/// transaction.
///
/// Either an existing unassigned owner is selected by ID, or a new owner
/// account is created inline from email + password. The outer `Result` is a
/// database failure; the inner `Err` carries owner-section form messages.
async fn resolve_owner(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    form: &RestaurantForm,
) -> Result<Result<User, Vec<String>>, RepositoryError> {
    if let Some(user_id) = form.user_id {
        let user_id = UserId::new(user_id);
        let Some(user) = UserRepository::get_by_id_in(tx, user_id).await? else {
            return Ok(Err(vec!["Selected owner could not be found.".to_owned()]));
        };
        if !user.is_restaurant_owner() {
            return Ok(Err(vec![
                "Selected user is not a restaurant owner.".to_owned(),
            ]));
        }
        if RestaurantRepository::owner_exists_in(tx, user.id).await? {
            return Ok(Err(vec![
                "This user already has a restaurant registered.".to_owned(),
            ]));
        }
        return Ok(Ok(user));
    }

    let owner_email = form.owner_email.as_deref().map(str::trim).unwrap_or("");
    if owner_email.is_empty() {
        return Ok(Err(vec![
            "Select an existing owner or provide a new owner's email and password.".to_owned(),
        ]));
    }

    let email = match tabledesk_core::Email::parse(owner_email) {
        Ok(email) => email,
        Err(e) => return Ok(Err(vec![format!("Owner email {e}.")])),
    };

    let password = form.owner_password.as_deref().unwrap_or("");
    let confirmation = form.owner_password_confirmation.as_deref().unwrap_or("");
    if password != confirmation {
        return Ok(Err(vec![
            "Owner password confirmation doesn't match password.".to_owned(),
        ]));
    }
    if let Err(e) = auth::validate_password(password) {
        return Ok(Err(e.form_messages()));
    }
    let password_hash = match auth::hash_password(password) {
        Ok(hash) => hash,
        Err(AuthError::Repository(e)) => return Err(e),
        Err(_) => {
            return Ok(Err(vec![
                "Something went wrong creating the owner account.".to_owned(),
            ]));
        }
    };

    match UserRepository::create_in(tx, &email, &password_hash, Role::RestaurantOwner).await {
        Ok(user) => Ok(Ok(user)),
        Err(RepositoryError::Conflict(message)) => Ok(Err(vec![format!("Owner {}", lowercase_first(&message))])),
        Err(other) => Err(other),
    }
}

fn lowercase_first(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_first() {
        assert_eq!(
            lowercase_first("Email has already been taken."),
            "email has already been taken."
        );
        assert_eq!(lowercase_first(""), "");
    }
}
