//! Authentication service.
//!
//! Password signup and login for portal users. Password hashing uses
//! Argon2id; validation mirrors the signup form's stated requirements.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use tabledesk_core::{Email, EmailError, Role};

use crate::db::{RepositoryError, users::UserRepository};
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password doesn't meet requirements.
    #[error("password does not meet requirements")]
    WeakPassword(Vec<String>),

    /// Password and confirmation differ.
    #[error("password confirmation does not match")]
    ConfirmationMismatch,

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A user with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Field error messages suitable for re-rendering a form.
    #[must_use]
    pub fn form_messages(&self) -> Vec<String> {
        match self {
            Self::InvalidEmail(e) => vec![format!("Email {e}.")],
            Self::WeakPassword(messages) => messages.clone(),
            Self::ConfirmationMismatch => {
                vec!["Password confirmation doesn't match password.".to_owned()]
            }
            Self::UserAlreadyExists => vec!["Email has already been taken.".to_owned()],
            Self::InvalidCredentials => vec!["Invalid email or password.".to_owned()],
            Self::PasswordHash | Self::Repository(_) => {
                vec!["Something went wrong. Please try again.".to_owned()]
            }
        }
    }
}

/// Authentication service for signup, login, and password changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new restaurant-owner account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::ConfirmationMismatch` if the confirmation differs.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if password != password_confirmation {
            return Err(AuthError::ConfirmationMismatch);
        }
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash, Role::RestaurantOwner)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Replace a user's password after reset-token verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::ConfirmationMismatch` if the confirmation differs.
    /// Returns `AuthError::Repository` if the user no longer exists.
    pub async fn reset_password(
        &self,
        user_id: tabledesk_core::UserId,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), AuthError> {
        if password != password_confirmation {
            return Err(AuthError::ConfirmationMismatch);
        }
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        self.users.update_password_hash(user_id, &password_hash).await?;

        Ok(())
    }
}

/// Validate password meets requirements.
///
/// Complexity rules only apply once the length floor is met, so a short
/// password yields a single length message rather than five.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with one message per failed rule.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(vec![format!(
            "Password is too short (minimum is {MIN_PASSWORD_LENGTH} characters)."
        )]));
    }

    let mut messages = Vec::new();
    if !password.chars().any(|c| c.is_ascii_digit()) {
        messages.push("Password must include at least one digit.".to_owned());
    }
    if !password.chars().any(char::is_lowercase) {
        messages.push("Password must include at least one lowercase letter.".to_owned());
    }
    if !password.chars().any(char::is_uppercase) {
        messages.push("Password must include at least one uppercase letter.".to_owned());
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        messages.push("Password must include at least one special character.".to_owned());
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(messages))
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password doesn't match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("Sup3r-secret").unwrap();
        assert!(verify_password("Sup3r-secret", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_gets_single_length_message() {
        let err = validate_password("aB1!").unwrap_err();
        let AuthError::WeakPassword(messages) = err else {
            panic!("expected WeakPassword");
        };
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("too short"));
    }

    #[test]
    fn test_complexity_rules_each_reported() {
        let err = validate_password("aaaaaaaa").unwrap_err();
        let AuthError::WeakPassword(messages) = err else {
            panic!("expected WeakPassword");
        };
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(validate_password("Str0ng-enough").is_ok());
    }
}
