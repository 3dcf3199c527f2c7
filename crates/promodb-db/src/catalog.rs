//! Read-only queries against the `catalog_entries` reference table.
//!
//! The catalog is owned by the OpenFoodFacts import job; the pipeline only
//! ever reads it. Scoring and barcode normalization live in
//! `promodb-catalog` — this module is plain row access.

use promodb_core::CatalogEntry;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `catalog_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogRow {
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
}

impl CatalogRow {
    /// Wraps the row into a [`CatalogEntry`] with the given match confidence.
    #[must_use]
    pub fn into_entry(self, match_score: f64) -> CatalogEntry {
        CatalogEntry {
            barcode: self.barcode,
            product_name: self.product_name,
            brand: self.brand,
            energy_kcal_100g: self.energy_kcal_100g,
            proteins_100g: self.proteins_100g,
            carbohydrates_100g: self.carbohydrates_100g,
            fat_100g: self.fat_100g,
            sugars_100g: self.sugars_100g,
            fiber_100g: self.fiber_100g,
            salt_100g: self.salt_100g,
            match_score,
        }
    }
}

/// Point lookup by exact barcode.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_catalog_entry(
    pool: &PgPool,
    barcode: &str,
) -> Result<Option<CatalogRow>, DbError> {
    let row = sqlx::query_as::<_, CatalogRow>(
        "SELECT barcode, product_name, brand, \
                energy_kcal_100g, proteins_100g, carbohydrates_100g, \
                fat_100g, sugars_100g, fiber_100g, salt_100g \
         FROM catalog_entries \
         WHERE barcode = $1",
    )
    .bind(barcode)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Rows whose name matches `name_lower` exactly (caller pre-lowercases).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn catalog_entries_by_exact_name(
    pool: &PgPool,
    name_lower: &str,
    limit: i64,
) -> Result<Vec<CatalogRow>, DbError> {
    let rows = sqlx::query_as::<_, CatalogRow>(
        "SELECT barcode, product_name, brand, \
                energy_kcal_100g, proteins_100g, carbohydrates_100g, \
                fat_100g, sugars_100g, fiber_100g, salt_100g \
         FROM catalog_entries \
         WHERE LOWER(product_name) = $1 \
         ORDER BY barcode \
         LIMIT $2",
    )
    .bind(name_lower)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Rows whose lowercased name matches every LIKE pattern in `patterns`.
///
/// Patterns must already carry their wildcards (e.g. `"%danio%"`). Results
/// are ordered by barcode so candidate iteration is deterministic.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn catalog_entries_by_fragments(
    pool: &PgPool,
    patterns: &[String],
    limit: i64,
) -> Result<Vec<CatalogRow>, DbError> {
    let rows = sqlx::query_as::<_, CatalogRow>(
        "SELECT barcode, product_name, brand, \
                energy_kcal_100g, proteins_100g, carbohydrates_100g, \
                fat_100g, sugars_100g, fiber_100g, salt_100g \
         FROM catalog_entries \
         WHERE LOWER(product_name) LIKE ALL($1) \
         ORDER BY barcode \
         LIMIT $2",
    )
    .bind(patterns)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Aggregate statistics over the reference catalog.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct CatalogStats {
    pub total_entries: i64,
    pub with_macros: i64,
}

/// Counts catalog entries, total and with at least an energy value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn catalog_stats(pool: &PgPool) -> Result<CatalogStats, DbError> {
    let stats = sqlx::query_as::<_, CatalogStats>(
        "SELECT COUNT(*) AS total_entries, \
                COUNT(energy_kcal_100g) AS with_macros \
         FROM catalog_entries",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
