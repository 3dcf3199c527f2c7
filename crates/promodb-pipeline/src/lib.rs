//! Reconciliation Engine.
//!
//! Takes the scraper's raw page observations, groups them by product URL,
//! resolves each group against the reference catalog, folds in the
//! enrichment oracle's advisory signals, and persists one priced
//! [`promodb_core::PromotionRecord`] per group through the store gateway.
//! One group failing never aborts the others; the run always ends with a
//! structured [`RunSummary`].

mod error;
mod group;
mod merge;
mod reconcile;
mod types;

pub use error::PipelineError;
pub use group::{group_items, placeholder_barcode};
pub use reconcile::Reconciler;
pub use types::{CatalogResolution, OfferGroup, PromotionPeriod, RunError, RunSummary};
