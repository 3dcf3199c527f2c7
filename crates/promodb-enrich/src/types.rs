//! Wire types for the enrichment oracle.

use promodb_core::{Category, EnrichmentResult, PrimaryMacro};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product handed to the oracle: name, discount text, and shelf price.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentInput {
    pub name: String,
    pub discount: Option<String>,
    pub original_price: Option<Decimal>,
}

/// One element of the oracle's JSON array answer, before validation.
///
/// Every field is optional and categorical strings are free-form here;
/// [`RawEnrichment::into_result`] collapses them onto the closed sets. A
/// response that does not even fit this lenient shape is an
/// [`crate::OracleError::Deserialize`] and goes through the retry path.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnrichment {
    clean_name: Option<String>,
    category: Option<String>,
    primary_macro: Option<String>,
    is_healthy: Option<bool>,
    promo_price: Option<f64>,
    is_meerdere_artikels: Option<bool>,
    deal_quantity: Option<u32>,
}

impl RawEnrichment {
    pub(crate) fn into_result(self) -> EnrichmentResult {
        EnrichmentResult {
            clean_name: self.clean_name.filter(|n| !n.trim().is_empty()),
            category: self
                .category
                .as_deref()
                .map_or(Category::Overig, Category::from_label),
            primary_macro: self
                .primary_macro
                .as_deref()
                .map_or(PrimaryMacro::None, PrimaryMacro::from_label),
            is_healthy: self.is_healthy.unwrap_or(false),
            promo_price: self
                .promo_price
                .and_then(Decimal::from_f64)
                .map(|d| d.round_dp(2)),
            is_multi_unit: self.is_meerdere_artikels,
            deal_quantity: self.deal_quantity,
        }
    }
}
