//! Remote fallback client for the OpenFoodFacts product API.

use std::time::Duration;

use promodb_core::CatalogEntry;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::CatalogError;

const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org/";

/// A remote hit is an exact barcode lookup and therefore fully trusted.
const REMOTE_MATCH_SCORE: f64 = 100.0;

/// Client for the OpenFoodFacts REST API.
///
/// Use [`OffClient::new`] for production or [`OffClient::with_base_url`] to
/// point at a mock server in tests.
#[derive(Debug)]
pub struct OffClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct OffResponse {
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    product_name: Option<String>,
    brands: Option<String>,
    #[serde(default)]
    nutriments: OffNutriments,
}

#[derive(Debug, Default, Deserialize)]
struct OffNutriments {
    #[serde(rename = "energy-kcal_100g")]
    energy_kcal_100g: Option<f64>,
    proteins_100g: Option<f64>,
    carbohydrates_100g: Option<f64>,
    fat_100g: Option<f64>,
    sugars_100g: Option<f64>,
    fiber_100g: Option<f64>,
    salt_100g: Option<f64>,
}

impl OffClient {
    /// Creates a new client pointed at the production OpenFoodFacts API.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, CatalogError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("promodb/0.1 (promo-aggregation)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| CatalogError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self { client, base_url })
    }

    /// Fetches a product fact sheet by exact barcode.
    ///
    /// Returns `Ok(None)` when the product is unknown (HTTP 404 or an empty
    /// `product` object) or has no usable name. A successful hit carries
    /// `match_score = 100`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure, timeout, or an
    ///   unexpected non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body is not the expected shape.
    pub async fn fetch_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogEntry>, CatalogError> {
        let url = self
            .base_url
            .join(&format!("api/v2/product/{barcode}.json"))
            .map_err(|_| CatalogError::InvalidBaseUrl(barcode.to_owned()))?;

        let response = self.client.get(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let parsed: OffResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let Some(product) = parsed.product else {
            return Ok(None);
        };
        let Some(product_name) = product.product_name.filter(|n| !n.trim().is_empty()) else {
            return Ok(None);
        };

        Ok(Some(CatalogEntry {
            barcode: barcode.to_owned(),
            product_name,
            brand: product.brands.filter(|b| !b.trim().is_empty()),
            energy_kcal_100g: to_decimal(product.nutriments.energy_kcal_100g),
            proteins_100g: to_decimal(product.nutriments.proteins_100g),
            carbohydrates_100g: to_decimal(product.nutriments.carbohydrates_100g),
            fat_100g: to_decimal(product.nutriments.fat_100g),
            sugars_100g: to_decimal(product.nutriments.sugars_100g),
            fiber_100g: to_decimal(product.nutriments.fiber_100g),
            salt_100g: to_decimal(product.nutriments.salt_100g),
            match_score: REMOTE_MATCH_SCORE,
        }))
    }
}

/// Converts an API float to the 2-decimal fixed scale used for persistence.
fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64).map(|d| d.round_dp(2))
}
