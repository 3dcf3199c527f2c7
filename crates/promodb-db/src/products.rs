//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use promodb_core::CatalogEntry;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub barcode: String,
    pub product_name: String,
    pub brand: Option<String>,
    pub energy_kcal_100g: Option<Decimal>,
    pub proteins_100g: Option<Decimal>,
    pub carbohydrates_100g: Option<Decimal>,
    pub fat_100g: Option<Decimal>,
    pub sugars_100g: Option<Decimal>,
    pub fiber_100g: Option<Decimal>,
    pub salt_100g: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional nutrition fields for a product upsert. Fields left `None` never
/// overwrite previously known values.
#[derive(Debug, Clone, Default)]
pub struct ProductNutrition {
    pub brand: Option<String>,
    pub energy_kcal_100g: Option<Decimal>,
    pub proteins_100g: Option<Decimal>,
    pub carbohydrates_100g: Option<Decimal>,
    pub fat_100g: Option<Decimal>,
    pub sugars_100g: Option<Decimal>,
    pub fiber_100g: Option<Decimal>,
    pub salt_100g: Option<Decimal>,
}

impl ProductNutrition {
    /// Copies the nutrition block from a matched catalog entry.
    #[must_use]
    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            brand: entry.brand.clone(),
            energy_kcal_100g: entry.energy_kcal_100g,
            proteins_100g: entry.proteins_100g,
            carbohydrates_100g: entry.carbohydrates_100g,
            fat_100g: entry.fat_100g,
            sugars_100g: entry.sugars_100g,
            fiber_100g: entry.fiber_100g,
            salt_100g: entry.salt_100g,
        }
    }
}

/// Fetches a product row by its exact barcode.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_barcode(
    pool: &PgPool,
    barcode: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT product_id, barcode, product_name, brand, \
                energy_kcal_100g, proteins_100g, carbohydrates_100g, \
                fat_100g, sugars_100g, fiber_100g, salt_100g, \
                created_at, updated_at \
         FROM products \
         WHERE barcode = $1",
    )
    .bind(barcode)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Upserts a product row keyed by barcode, coalesce-style.
///
/// On conflict only non-null incoming fields overwrite existing ones, so a
/// later scrape with sparse data can never erase previously known nutrition
/// values. Returns the `product_id` of the upserted row; inserts generate a
/// fresh v4 UUID.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(
    pool: &PgPool,
    barcode: &str,
    product_name: &str,
    nutrition: &ProductNutrition,
) -> Result<Uuid, DbError> {
    let product_id: Uuid = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO products \
             (product_id, barcode, product_name, brand, \
              energy_kcal_100g, proteins_100g, carbohydrates_100g, \
              fat_100g, sugars_100g, fiber_100g, salt_100g) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (barcode) DO UPDATE SET \
             product_name       = COALESCE($3, products.product_name), \
             brand              = COALESCE($4, products.brand), \
             energy_kcal_100g   = COALESCE($5, products.energy_kcal_100g), \
             proteins_100g      = COALESCE($6, products.proteins_100g), \
             carbohydrates_100g = COALESCE($7, products.carbohydrates_100g), \
             fat_100g           = COALESCE($8, products.fat_100g), \
             sugars_100g        = COALESCE($9, products.sugars_100g), \
             fiber_100g         = COALESCE($10, products.fiber_100g), \
             salt_100g          = COALESCE($11, products.salt_100g), \
             updated_at         = NOW() \
         RETURNING product_id",
    )
    .bind(Uuid::new_v4())
    .bind(barcode)
    .bind(product_name)
    .bind(&nutrition.brand)
    .bind(nutrition.energy_kcal_100g)
    .bind(nutrition.proteins_100g)
    .bind(nutrition.carbohydrates_100g)
    .bind(nutrition.fat_100g)
    .bind(nutrition.sugars_100g)
    .bind(nutrition.fiber_100g)
    .bind(nutrition.salt_100g)
    .fetch_one(pool)
    .await?;

    Ok(product_id)
}
