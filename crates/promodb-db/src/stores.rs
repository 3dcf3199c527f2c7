//! Database operations for the `stores` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub store_id: Uuid,
    pub store_name: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Looks a store up by name, case-insensitively.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_store_by_name(pool: &PgPool, name: &str) -> Result<Option<StoreRow>, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(
        "SELECT store_id, store_name, logo_url, created_at \
         FROM stores \
         WHERE LOWER(store_name) = LOWER($1)",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the store's id, creating the row if it does not exist yet.
///
/// Idempotent: concurrent callers race on the unique `store_name` and both
/// receive the same id. An existing logo URL is never nulled out.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_store(
    pool: &PgPool,
    name: &str,
    logo_url: Option<&str>,
) -> Result<Uuid, DbError> {
    let store_id: Uuid = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO stores (store_id, store_name, logo_url) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (store_name) DO UPDATE SET \
             logo_url = COALESCE(EXCLUDED.logo_url, stores.logo_url) \
         RETURNING store_id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(logo_url)
    .fetch_one(pool)
    .await?;

    Ok(store_id)
}
