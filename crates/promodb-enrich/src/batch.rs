//! Batch orchestration over the oracle client.

use promodb_core::EnrichmentResult;

use crate::client::OracleClient;
use crate::retry::retry_with_backoff;
use crate::types::EnrichmentInput;

/// Upstream payload cap; batches never exceed this many products.
const MAX_BATCH_SIZE: usize = 20;

/// Best-effort batch enricher.
///
/// Splits the input into capped batches, submits them sequentially, retries
/// each batch a bounded number of times, and substitutes neutral defaults
/// for batches that stay broken. [`Enricher::enrich`] is infallible and
/// always returns exactly one result per input, in input order.
pub struct Enricher {
    client: Option<OracleClient>,
    batch_size: usize,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl Enricher {
    #[must_use]
    pub fn new(
        client: OracleClient,
        batch_size: usize,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            client: Some(client),
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            max_retries,
            backoff_base_ms,
        }
    }

    /// An enricher with no oracle behind it: every call yields neutral
    /// defaults without any network traffic. Used when no API key is
    /// configured.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: None,
            batch_size: MAX_BATCH_SIZE,
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Enriches a slice of products, batch by batch.
    ///
    /// The returned vector always has `items.len()` elements in input order,
    /// regardless of oracle success, failure, or malformed output.
    pub async fn enrich(&self, items: &[EnrichmentInput]) -> Vec<EnrichmentResult> {
        if items.is_empty() {
            return Vec::new();
        }

        let Some(client) = &self.client else {
            tracing::debug!(
                count = items.len(),
                "enrichment disabled — returning neutral defaults"
            );
            return vec![EnrichmentResult::default(); items.len()];
        };

        let mut results = Vec::with_capacity(items.len());
        for (batch_index, chunk) in items.chunks(self.batch_size).enumerate() {
            tracing::debug!(batch = batch_index + 1, size = chunk.len(), "submitting oracle batch");
            let outcome = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                client.generate(chunk)
            })
            .await;

            match outcome {
                Ok(batch_results) => {
                    results.extend(align(batch_results, chunk.len()));
                }
                Err(e) => {
                    tracing::warn!(
                        batch = batch_index + 1,
                        size = chunk.len(),
                        error = %e,
                        "oracle batch failed after retries — substituting neutral defaults"
                    );
                    results.extend(std::iter::repeat_with(EnrichmentResult::default).take(chunk.len()));
                }
            }
        }

        results
    }
}

/// Restores positional alignment: truncates surplus results and pads missing
/// ones with neutral defaults.
fn align(mut results: Vec<EnrichmentResult>, expected: usize) -> Vec<EnrichmentResult> {
    if results.len() != expected {
        tracing::warn!(
            expected,
            got = results.len(),
            "oracle returned a mismatched result count — realigning"
        );
        results.truncate(expected);
        while results.len() < expected {
            results.push(EnrichmentResult::default());
        }
    }
    results
}
