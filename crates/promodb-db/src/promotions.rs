//! Database operations for the `promotions` table.
//!
//! Promotions are never mutated once written: a new scraper run deactivates
//! the store's active set and inserts fresh rows, so history is retained.

use chrono::{DateTime, NaiveDate, Utc};
use promodb_core::PromotionRecord;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `promotions` table, joined with the owning store's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PromotionRow {
    pub promo_id: Uuid,
    pub store_id: Uuid,
    pub store_name: String,
    pub product_id: Option<Uuid>,
    pub barcode: String,
    pub display_name: String,
    pub discount_label: Option<String>,
    pub original_price: Option<Decimal>,
    pub promo_price: Option<Decimal>,
    pub equivalent_percentage: Option<Decimal>,
    pub is_multi_unit: bool,
    pub deal_quantity: i32,
    pub category: String,
    pub primary_macro: String,
    pub is_healthy: bool,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

macro_rules! promotion_select {
    ($tail:literal) => {
        concat!(
            "SELECT p.promo_id, p.store_id, s.store_name, p.product_id, \
                    p.barcode, p.display_name, p.discount_label, \
                    p.original_price, p.promo_price, p.equivalent_percentage, \
                    p.is_multi_unit, p.deal_quantity, \
                    p.category, p.primary_macro, p.is_healthy, \
                    p.valid_from, p.valid_until, p.is_active, p.created_at \
             FROM promotions p \
             JOIN stores s ON p.store_id = s.store_id ",
            $tail
        )
    };
}

/// Inserts a new active promotion and returns its generated id.
///
/// A unique violation on the active-promotion index (same store, barcode,
/// and start date already active) is a benign duplicate: the function
/// returns `Ok(None)` instead of an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any other database failure.
pub async fn create_promotion(
    pool: &PgPool,
    record: &PromotionRecord,
) -> Result<Option<Uuid>, DbError> {
    let promo_id = Uuid::new_v4();
    let deal_quantity = i32::try_from(record.deal_quantity).unwrap_or(i32::MAX);

    let result = sqlx::query(
        "INSERT INTO promotions \
             (promo_id, store_id, product_id, barcode, display_name, discount_label, \
              original_price, promo_price, equivalent_percentage, \
              is_multi_unit, deal_quantity, category, primary_macro, is_healthy, \
              valid_from, valid_until, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, \
                 $7, $8, $9::numeric(6,2), \
                 $10, $11, $12, $13, $14, \
                 $15, $16, TRUE)",
    )
    .bind(promo_id)
    .bind(record.store_id)
    .bind(record.product_id)
    .bind(&record.barcode)
    .bind(&record.display_name)
    .bind(&record.discount_label)
    .bind(record.original_price)
    .bind(record.promo_price)
    .bind(record.equivalent_percentage)
    .bind(record.is_multi_unit)
    .bind(deal_quantity)
    .bind(record.category.as_str())
    .bind(record.primary_macro.as_str())
    .bind(record.is_healthy)
    .bind(record.valid_from)
    .bind(record.valid_until)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(Some(promo_id)),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::debug!(
                barcode = %record.barcode,
                store_id = %record.store_id,
                "promotion already active for this period, skipping duplicate"
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deactivates ALL currently-active promotions for a store.
///
/// Run barrier: a scraper run calls this, and awaits it, before inserting the
/// new batch so the active set reflects exactly the latest scrape.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_store_promotions(pool: &PgPool, store_id: Uuid) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE promotions \
         SET is_active = FALSE \
         WHERE store_id = $1 AND is_active = TRUE",
    )
    .bind(store_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Deactivates a store's promotions whose `valid_until` has passed.
///
/// Housekeeping variant of [`deactivate_store_promotions`]; returns the
/// affected count for observability.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_expired_promotions(pool: &PgPool, store_id: Uuid) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE promotions \
         SET is_active = FALSE \
         WHERE store_id = $1 AND is_active = TRUE AND valid_until < CURRENT_DATE",
    )
    .bind(store_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Lists active promotions, optionally scoped to one store, soonest-expiring
/// first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_active_promotions(
    pool: &PgPool,
    store_id: Option<Uuid>,
) -> Result<Vec<PromotionRow>, DbError> {
    let rows = if let Some(store_id) = store_id {
        sqlx::query_as::<_, PromotionRow>(promotion_select!(
            "WHERE p.store_id = $1 AND p.is_active = TRUE ORDER BY p.valid_until"
        ))
        .bind(store_id)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, PromotionRow>(promotion_select!(
            "WHERE p.is_active = TRUE ORDER BY p.valid_until"
        ))
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

/// Lists active promotions for a store looked up by name, case-insensitively.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_active_promotions_by_store_name(
    pool: &PgPool,
    store_name: &str,
) -> Result<Vec<PromotionRow>, DbError> {
    let rows = sqlx::query_as::<_, PromotionRow>(promotion_select!(
        "WHERE p.is_active = TRUE AND LOWER(s.store_name) = LOWER($1) \
         ORDER BY p.valid_until"
    ))
    .bind(store_name)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
