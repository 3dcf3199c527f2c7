//! Enrichment Oracle orchestration.
//!
//! Wraps the external text-understanding service that produces cleaned
//! display names, categories, macro tags, and an advisory promo price per
//! product. The oracle is best-effort: batches are capped, retried with a
//! linear backoff, and degraded to neutral defaults when the service stays
//! unavailable or answers in the wrong shape. The one structural guarantee
//! this crate makes is positional alignment — the output list always has the
//! same length and order as the input, no matter how the oracle misbehaves.

mod batch;
mod client;
mod error;
mod retry;
mod types;

pub use batch::Enricher;
pub use client::OracleClient;
pub use error::OracleError;
pub use types::EnrichmentInput;
