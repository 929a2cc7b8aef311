//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! tabledesk-cli admin create -e admin@example.com -p 'Str0ng-password!'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;
use thiserror::Error;

use tabledesk_core::{Email, Role};
use tabledesk_portal::db::users::UserRepository;
use tabledesk_portal::services::auth::{hash_password, validate_password};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password failed validation.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// User already exists.
    #[error("A user already exists with email: {0}")]
    UserExists(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError` if the email or password is invalid, the email is
/// already taken, or the database operation fails.
pub async fn create_user(email: &str, password: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    validate_password(password).map_err(|e| {
        AdminError::WeakPassword(e.form_messages().join(" "))
    })?;
    let password_hash =
        hash_password(password).map_err(|e| AdminError::Repository(e.to_string()))?;

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| AdminError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin user: {}", email);
    let users = UserRepository::new(&pool);
    let user = users
        .create(&email, &password_hash, Role::Admin)
        .await
        .map_err(|e| match e {
            tabledesk_portal::db::RepositoryError::Conflict(_) => {
                AdminError::UserExists(email.to_string())
            }
            other => AdminError::Repository(other.to_string()),
        })?;

    tracing::info!("Admin user created with id {}", user.id);
    Ok(user.id.as_i32())
}
