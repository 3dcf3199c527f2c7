//! Domain model, configuration, and discount-label parsing for promodb.
//!
//! This crate carries no I/O: persistence lives in `promodb-db`, the catalog
//! matcher in `promodb-catalog`, and the enrichment client in
//! `promodb-enrich`. Everything here is pure data and pure functions so the
//! other crates can share one vocabulary.

use thiserror::Error;

mod app_config;
mod config;
pub mod catalog;
pub mod discount;
pub mod promo;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use catalog::CatalogEntry;
pub use config::{load_app_config, load_app_config_from_env};
pub use discount::{parse_discount_label, DiscountRule};
pub use promo::{Category, EnrichmentResult, PrimaryMacro, PromotionRecord, RawScrapeItem};
pub use stores::{load_stores, StoreConfig, StoresFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("invalid stores configuration: {0}")]
    Validation(String),
}
