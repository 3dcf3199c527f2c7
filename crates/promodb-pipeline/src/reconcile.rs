//! Run orchestration: group → resolve → enrich → merge → persist.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use promodb_catalog::{CatalogError, CatalogMatcher};
use promodb_core::{EnrichmentResult, RawScrapeItem};
use promodb_db::ProductNutrition;
use promodb_enrich::{Enricher, EnrichmentInput};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::group::group_items;
use crate::merge::build_record;
use crate::types::{CatalogResolution, OfferGroup, PromotionPeriod, RunError, RunSummary};

/// Per-group outcome, folded into the run summary.
enum GroupOutcome {
    Persisted { matched: bool, created: bool },
    Failed(RunError),
}

/// The reconciliation engine.
///
/// All collaborators are injected at construction: the pool for the store
/// gateway, the catalog matcher, and the (possibly disabled) enricher.
/// Lifecycle is owned by the process entry point.
pub struct Reconciler {
    pool: PgPool,
    matcher: CatalogMatcher,
    enricher: Enricher,
    max_concurrent_groups: usize,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        pool: PgPool,
        matcher: CatalogMatcher,
        enricher: Enricher,
        max_concurrent_groups: usize,
    ) -> Self {
        Self {
            pool,
            matcher,
            enricher,
            max_concurrent_groups: max_concurrent_groups.max(1),
        }
    }

    /// Runs one full reconciliation batch for a store.
    ///
    /// Deactivates the store's whole active promotion set, then resolves,
    /// enriches, and persists every URL group. Per-group failures land in
    /// the summary's error list; the batch itself only fails on store-level
    /// database errors.
    ///
    /// Overlapping runs for the same store are an unsupported race: each run
    /// replaces the store's active set wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Db`] if the store upsert or the deactivation
    /// barrier fails.
    pub async fn run(
        &self,
        store_name: &str,
        logo_url: Option<&str>,
        period: PromotionPeriod,
        items: Vec<RawScrapeItem>,
    ) -> Result<RunSummary, PipelineError> {
        let groups = group_items(items);
        tracing::info!(
            store = store_name,
            groups = groups.len(),
            valid_from = %period.valid_from,
            valid_until = %period.valid_until,
            "starting reconciliation run"
        );

        let store_id = promodb_db::get_or_create_store(&self.pool, store_name, logo_url).await?;

        // Barrier: the previous active set must be observably gone before any
        // insert below starts.
        let deactivated = promodb_db::deactivate_store_promotions(&self.pool, store_id).await?;
        tracing::info!(store = store_name, deactivated, "deactivated previous promotion set");

        // Catalog resolution per group, order-preserving so the enrichment
        // pass stays positionally aligned.
        let resolution_futures: Vec<BoxFuture<'_, Result<CatalogResolution, CatalogError>>> =
            groups
                .iter()
                .map(|group| Box::pin(self.resolve_group(group)) as BoxFuture<'_, _>)
                .collect();
        let resolutions: Vec<Result<CatalogResolution, CatalogError>> =
            stream::iter(resolution_futures)
                .buffered(self.max_concurrent_groups)
                .collect()
                .await;

        // One aligned enrichment pass over all groups.
        let inputs: Vec<EnrichmentInput> = groups
            .iter()
            .zip(&resolutions)
            .map(|(group, resolution)| EnrichmentInput {
                name: oracle_input_name(group, resolution),
                discount: Some(group.discount_label.clone()),
                original_price: group.scraped_price,
            })
            .collect();
        let enrichments = self.enricher.enrich(&inputs).await;

        // Merge and persist; groups are independent beyond the barrier above.
        let persist_futures: Vec<BoxFuture<'_, GroupOutcome>> = groups
            .iter()
            .zip(resolutions.into_iter())
            .zip(enrichments.into_iter())
            .map(|((group, resolution), enrichment)| {
                Box::pin(self.persist_group(store_id, period, group, resolution, enrichment))
                    as BoxFuture<'_, _>
            })
            .collect();
        let outcomes: Vec<GroupOutcome> = stream::iter(persist_futures)
            .buffer_unordered(self.max_concurrent_groups)
            .collect()
            .await;

        let mut summary = RunSummary {
            store_id,
            matched: 0,
            not_found: 0,
            created: 0,
            deactivated,
            errors: Vec::new(),
            valid_from: period.valid_from,
            valid_until: period.valid_until,
        };
        for outcome in outcomes {
            match outcome {
                GroupOutcome::Persisted { matched, created } => {
                    if matched {
                        summary.matched += 1;
                    } else {
                        summary.not_found += 1;
                    }
                    if created {
                        summary.created += 1;
                    }
                }
                GroupOutcome::Failed(error) => summary.errors.push(error),
            }
        }

        tracing::info!(
            store = store_name,
            matched = summary.matched,
            not_found = summary.not_found,
            created = summary.created,
            errors = summary.error_count(),
            "reconciliation run finished"
        );

        Ok(summary)
    }

    /// Tries each barcode candidate in listed order; the first catalog hit
    /// wins. No hit at all is a placeholder, not an error.
    async fn resolve_group(
        &self,
        group: &OfferGroup,
    ) -> Result<CatalogResolution, CatalogError> {
        for candidate in &group.barcode_candidates {
            if let Some(entry) = self.matcher.match_by_barcode(candidate).await? {
                return Ok(CatalogResolution::Matched(entry));
            }
        }
        Ok(CatalogResolution::Placeholder)
    }

    /// Builds the final record for one group and writes it through the store
    /// gateway. Every failure is caught and scoped to this group.
    async fn persist_group(
        &self,
        store_id: Uuid,
        period: PromotionPeriod,
        group: &OfferGroup,
        resolution: Result<CatalogResolution, CatalogError>,
        enrichment: EnrichmentResult,
    ) -> GroupOutcome {
        let resolution = match resolution {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!(url = %group.source_url, error = %e, "catalog resolution failed");
                return GroupOutcome::Failed(RunError {
                    source_url: group.source_url.clone(),
                    message: e.to_string(),
                });
            }
        };
        let matched = matches!(resolution, CatalogResolution::Matched(_));

        let mut record = build_record(group, &resolution, &enrichment, store_id, period);
        let nutrition = match &resolution {
            CatalogResolution::Matched(entry) => ProductNutrition::from_catalog(entry),
            CatalogResolution::Placeholder => ProductNutrition::default(),
        };

        let persisted = async {
            let product_id = promodb_db::upsert_product(
                &self.pool,
                &record.barcode,
                &record.display_name,
                &nutrition,
            )
            .await?;
            record.product_id = Some(product_id);
            promodb_db::create_promotion(&self.pool, &record).await
        }
        .await;

        match persisted {
            Ok(promo_id) => GroupOutcome::Persisted {
                matched,
                created: promo_id.is_some(),
            },
            Err(e) => {
                tracing::error!(url = %group.source_url, error = %e, "failed to persist group");
                GroupOutcome::Failed(RunError {
                    source_url: group.source_url.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// The name handed to the oracle: the scraped page title when present, else
/// the matched catalog name, else a generic stand-in.
fn oracle_input_name(
    group: &OfferGroup,
    resolution: &Result<CatalogResolution, CatalogError>,
) -> String {
    if let Some(name) = group
        .scraped_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        return name.to_owned();
    }
    if let Ok(CatalogResolution::Matched(entry)) = resolution {
        return entry.product_name.clone();
    }
    "Unknown Product".to_owned()
}
