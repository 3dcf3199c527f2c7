//! Intermediate and summary types for a reconciliation run.

use chrono::NaiveDate;
use promodb_core::CatalogEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All raw observations for one product page, merged under its URL.
///
/// The same physical product can expose several packaging barcodes on one
/// page; candidates keep their scraped order so the first listed wins.
#[derive(Debug, Clone)]
pub struct OfferGroup {
    pub source_url: String,
    pub scraped_name: Option<String>,
    pub discount_label: String,
    pub barcode_candidates: Vec<String>,
    pub scraped_price: Option<Decimal>,
}

/// Outcome of catalog resolution for one group.
#[derive(Debug, Clone)]
pub enum CatalogResolution {
    /// A catalog entry was found under one of the barcode variants.
    Matched(CatalogEntry),
    /// No entry anywhere; the record carries a deterministic placeholder
    /// barcode derived from the page URL.
    Placeholder,
}

/// Promotion validity window for one scraper run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionPeriod {
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

/// Diagnostic for a group that failed to resolve or persist.
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub source_url: String,
    pub message: String,
}

/// Aggregate result of one reconciliation run, returned to the caller even
/// when every single group failed.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub store_id: Uuid,
    /// Groups resolved to a catalog entry.
    pub matched: usize,
    /// Groups persisted with a placeholder product.
    pub not_found: usize,
    /// Promotions actually inserted (benign duplicates excluded).
    pub created: usize,
    /// Previously-active promotions flipped off at the start of the run.
    pub deactivated: u64,
    pub errors: Vec<RunError>,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl RunSummary {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
