//! Database operations for the portal `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts for admins and restaurant owners
//! - `restaurants` - Restaurant registrations (one per owner)
//! - `session` - Session storage (tower-sessions)
//!
//! Constraints the application relies on:
//!
//! - `users.email` UNIQUE
//! - `restaurants.email` UNIQUE
//! - `restaurants.owner_user_id` UNIQUE - the authoritative
//!   one-restaurant-per-owner guard; in-code ownership checks are a UX fast
//!   path that can lose a race, the index cannot.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/portal/migrations/` and run via:
//! ```bash
//! cargo run -p tabledesk-cli -- migrate
//! ```

pub mod restaurants;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use restaurants::RestaurantRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or unique owner).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error to [`RepositoryError::Conflict`] with `message` when
    /// it is a unique-constraint violation, and to
    /// [`RepositoryError::Database`] otherwise.
    pub(crate) fn from_unique_violation(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
