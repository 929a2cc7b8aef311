//! Seed the database with development data.
//!
//! Idempotent: existing users (matched by email) are left alone, so the
//! command can be re-run safely.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;
use thiserror::Error;

use tabledesk_core::{Email, RestaurantStatus, Role};
use tabledesk_portal::db::restaurants::RestaurantRepository;
use tabledesk_portal::db::users::UserRepository;
use tabledesk_portal::models::{RestaurantForm, User};
use tabledesk_portal::services::auth::hash_password;

const SEED_PASSWORD: &str = "Dev-passw0rd!";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid seed data.
    #[error("Invalid seed data: {0}")]
    InvalidData(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Seed development users and a sample pending restaurant.
///
/// # Errors
///
/// Returns `SeedError` if `DATABASE_URL` is unset or a database operation
/// fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| SeedError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let admin = ensure_user(&pool, "admin@tabledesk.test", Role::Admin).await?;
    tracing::info!(id = %admin.id, "admin ready");

    let owner = ensure_user(&pool, "owner@tabledesk.test", Role::RestaurantOwner).await?;
    tracing::info!(id = %owner.id, "owner ready");

    let restaurants = RestaurantRepository::new(&pool);
    let existing = restaurants
        .get_by_owner(owner.id)
        .await
        .map_err(|e| SeedError::Repository(e.to_string()))?;

    if existing.is_none() {
        let form = RestaurantForm {
            name: "Blue Fig".to_owned(),
            owner_name: "Dana Halabi".to_owned(),
            email: "hello@bluefig.test".to_owned(),
            phone: "+1 555 010 0199".to_owned(),
            address: "12 Harbour Street, Portsmouth".to_owned(),
            plan: "free".to_owned(),
            ..RestaurantForm::default()
        };
        let profile = form
            .validate()
            .map_err(|errors| SeedError::InvalidData(errors.join(" ")))?;

        let restaurant = restaurants
            .create(owner.id, &profile, RestaurantStatus::Pending)
            .await
            .map_err(|e| SeedError::Repository(e.to_string()))?;
        tracing::info!(id = %restaurant.id, "sample restaurant created (pending review)");
    } else {
        tracing::info!("sample restaurant already present, skipping");
    }

    tracing::info!("Seed complete. All seeded accounts use the password {SEED_PASSWORD:?}");
    Ok(())
}

/// Fetch a user by email, creating them with the seed password if missing.
async fn ensure_user(pool: &PgPool, email: &str, role: Role) -> Result<User, SeedError> {
    let email = Email::parse(email).map_err(|e| SeedError::InvalidData(e.to_string()))?;
    let users = UserRepository::new(pool);

    if let Some(user) = users
        .get_by_email(&email)
        .await
        .map_err(|e| SeedError::Repository(e.to_string()))?
    {
        return Ok(user);
    }

    let password_hash =
        hash_password(SEED_PASSWORD).map_err(|e| SeedError::Repository(e.to_string()))?;
    users
        .create(&email, &password_hash, role)
        .await
        .map_err(|e| SeedError::Repository(e.to_string()))
}
