//! Restaurant repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use tabledesk_core::{Email, Plan, RestaurantId, RestaurantStatus, UserId};

use super::RepositoryError;
use crate::models::{Restaurant, RestaurantProfile};

const EMAIL_TAKEN: &str = "Email has already been taken.";
const OWNER_TAKEN: &str = "This user already has a restaurant registered.";

/// Internal row type for restaurant queries.
#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: i32,
    name: String,
    owner_name: String,
    email: String,
    phone: String,
    address: String,
    plan: String,
    status: String,
    owner_user_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = RepositoryError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let plan = row.plan.parse::<Plan>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid plan in database: {e}"))
        })?;
        let status = row.status.parse::<RestaurantStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: RestaurantId::new(row.id),
            name: row.name,
            owner_name: row.owner_name,
            email,
            phone: row.phone,
            address: row.address,
            plan,
            status,
            owner_user_id: UserId::new(row.owner_user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_RESTAURANT: &str = "SELECT id, name, owner_name, email, phone, address, plan, \
     status, owner_user_id, created_at, updated_at FROM restaurants";

/// Counts of restaurants per lifecycle status, for the admin listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub suspended: i64,
}

/// Repository for restaurant database operations.
pub struct RestaurantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RestaurantRepository<'a> {
    /// Create a new restaurant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all restaurants, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Restaurant>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, RestaurantRow>(&format!("{SELECT_RESTAURANT} ORDER BY created_at DESC"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count restaurants per lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM restaurants GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.parse::<RestaurantStatus>() {
                Ok(RestaurantStatus::Pending) => counts.pending = count,
                Ok(RestaurantStatus::Approved) => counts.approved = count,
                Ok(RestaurantStatus::Suspended) => counts.suspended = count,
                Err(e) => {
                    return Err(RepositoryError::DataCorruption(format!(
                        "invalid status in database: {e}"
                    )));
                }
            }
        }

        Ok(counts)
    }

    /// Get a restaurant by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!("{SELECT_RESTAURANT} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the restaurant owned by a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_owner(
        &self,
        owner_user_id: UserId,
    ) -> Result<Option<Restaurant>, RepositoryError> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "{SELECT_RESTAURANT} WHERE owner_user_id = $1"
        ))
        .bind(owner_user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether a user already owns a restaurant, on an explicit connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner_exists_in(
        conn: &mut PgConnection,
        owner_user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM restaurants WHERE owner_user_id = $1)",
        )
        .bind(owner_user_id.as_i32())
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Create a restaurant owned by `owner_user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate email or a second
    /// restaurant for the same owner.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner_user_id: UserId,
        profile: &RestaurantProfile,
        status: RestaurantStatus,
    ) -> Result<Restaurant, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_in(&mut conn, owner_user_id, profile, status).await
    }

    /// Create a restaurant on an explicit connection, so callers can include
    /// the insert in a larger transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate email or a second
    /// restaurant for the same owner.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_in(
        conn: &mut PgConnection,
        owner_user_id: UserId,
        profile: &RestaurantProfile,
        status: RestaurantStatus,
    ) -> Result<Restaurant, RepositoryError> {
        let row = sqlx::query_as::<_, RestaurantRow>(
            "INSERT INTO restaurants (name, owner_name, email, phone, address, plan, status, owner_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, name, owner_name, email, phone, address, plan, status, \
                       owner_user_id, created_at, updated_at",
        )
        .bind(&profile.name)
        .bind(&profile.owner_name)
        .bind(profile.email.as_str())
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(profile.plan.as_str())
        .bind(status.as_str())
        .bind(owner_user_id.as_i32())
        .fetch_one(conn)
        .await
        .map_err(map_create_conflict)?;

        row.try_into()
    }

    /// Update a restaurant's profile fields and status.
    ///
    /// Callers are expected to have resolved the status through the policy
    /// layer already; this method persists whatever it is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the restaurant doesn't exist.
    /// Returns `RepositoryError::Conflict` on a duplicate email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: RestaurantId,
        profile: &RestaurantProfile,
        status: RestaurantStatus,
    ) -> Result<Restaurant, RepositoryError> {
        let row = sqlx::query_as::<_, RestaurantRow>(
            "UPDATE restaurants \
             SET name = $1, owner_name = $2, email = $3, phone = $4, address = $5, \
                 plan = $6, status = $7, updated_at = now() \
             WHERE id = $8 \
             RETURNING id, name, owner_name, email, phone, address, plan, status, \
                       owner_user_id, created_at, updated_at",
        )
        .bind(&profile.name)
        .bind(&profile.owner_name)
        .bind(profile.email.as_str())
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(profile.plan.as_str())
        .bind(status.as_str())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, EMAIL_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Set a restaurant's lifecycle status unconditionally.
    ///
    /// Used by the admin approve/suspend actions; idempotent-safe when the
    /// restaurant is already in the target state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the restaurant doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: RestaurantId,
        status: RestaurantStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE restaurants SET status = $1, updated_at = now() WHERE id = $2")
                .bind(status.as_str())
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a restaurant. Dependent child rows cascade via foreign keys.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the restaurant doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: RestaurantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Distinguish which unique index a restaurant insert tripped over.
fn map_create_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = if db_err
            .constraint()
            .is_some_and(|c| c.contains("owner_user_id"))
        {
            OWNER_TAKEN
        } else {
            EMAIL_TAKEN
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
