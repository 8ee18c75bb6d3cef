use crate::error::ApiError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// The acquire timeout bounds every datastore operation; callers see an
/// acquisition timeout as the retryable `Unavailable` error.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check whether a chef profile exists
pub async fn chef_exists(pool: &PgPool, chef_id: i32) -> Result<bool, ApiError> {
    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chef_profiles WHERE id = $1)")
            .bind(chef_id)
            .fetch_one(pool)
            .await?;

    Ok(exists.unwrap_or(false))
}

/// Check whether a user already owns a chef profile
///
/// Used on profile creation; a user account carries at most one profile.
pub async fn chef_profile_exists_for_user(
    pool: &PgPool,
    user_id: i32,
) -> Result<bool, ApiError> {
    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chef_profiles WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(exists.unwrap_or(false))
}
