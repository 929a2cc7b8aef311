//! Integration tests for Tabledesk.
//!
//! These tests run against a real `PostgreSQL` database and are ignored by
//! default. Run them with:
//!
//! ```bash
//! # Start the database and export DATABASE_URL, then
//! cargo test -p tabledesk-integration-tests -- --ignored
//! ```
//!
//! Migrations are applied on first connect; each test provisions its own
//! users and restaurants under unique emails so tests can run against a
//! shared database without interfering with each other.

use sqlx::PgPool;
use uuid::Uuid;

use tabledesk_core::{Email, Role, UserId};
use tabledesk_portal::db::users::UserRepository;
use tabledesk_portal::models::CurrentUser;
use tabledesk_portal::services::auth::hash_password;

/// Shared handle for a test run: a migrated connection pool plus fixture
/// helpers.
pub struct TestContext {
    pub pool: PgPool,
}

impl TestContext {
    /// Connect to the database named by `DATABASE_URL` and apply migrations.
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is unset, the connection fails, or a
    /// migration fails to apply. Tests cannot proceed in any of those cases.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("../portal/migrations")
            .run(&pool)
            .await
            .expect("Failed to apply migrations");
        Self { pool }
    }

    /// A unique email address for test fixtures.
    #[must_use]
    pub fn unique_email(prefix: &str) -> String {
        format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
    }

    /// Create a restaurant-owner account and return it as the acting user.
    pub async fn create_owner(&self) -> CurrentUser {
        self.create_user(Role::RestaurantOwner).await
    }

    /// Create an admin account and return it as the acting user.
    pub async fn create_admin(&self) -> CurrentUser {
        self.create_user(Role::Admin).await
    }

    async fn create_user(&self, role: Role) -> CurrentUser {
        let email =
            Email::parse(&Self::unique_email("user")).expect("fixture email is well-formed");
        let password_hash =
            hash_password("Int3gration-pass!").expect("fixture password hashes cleanly");
        let user = UserRepository::new(&self.pool)
            .create(&email, &password_hash, role)
            .await
            .expect("Failed to create fixture user");
        CurrentUser {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }

    /// Number of restaurants persisted for `owner`.
    pub async fn restaurant_count_for(&self, owner: UserId) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants WHERE owner_user_id = $1")
            .bind(owner.as_i32())
            .fetch_one(&self.pool)
            .await
            .expect("count query failed")
    }

    /// Whether a user account exists for `email`.
    pub async fn user_exists(&self, email: &str) -> bool {
        let email = Email::parse(email).expect("fixture email is well-formed");
        UserRepository::new(&self.pool)
            .get_by_email(&email)
            .await
            .expect("user lookup failed")
            .is_some()
    }
}
