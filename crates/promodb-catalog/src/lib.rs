//! Reference Catalog Matcher.
//!
//! Resolves a scraped barcode or product name to a nutrition fact sheet.
//! Lookups go to the local `catalog_entries` table first (via `promodb-db`),
//! trying the barcode variants that bridge UPC-A and EAN-13; when nothing is
//! found locally the matcher falls back to the remote OpenFoodFacts API.
//! Absence is a valid outcome everywhere — a missing entry is `None`, never
//! an error.

mod barcode;
mod error;
mod matcher;
mod remote;

pub use barcode::barcode_variants;
pub use error::CatalogError;
pub use matcher::{name_match_score, CatalogMatcher};
pub use remote::OffClient;
