//! `ingest` command: reconcile one scraped batch file for a store.

use std::path::Path;

use chrono::NaiveDate;
use promodb_catalog::{CatalogMatcher, OffClient};
use promodb_core::RawScrapeItem;
use promodb_enrich::{Enricher, OracleClient};
use promodb_pipeline::{PromotionPeriod, Reconciler};

/// Reads the batch file, wires up the pipeline, and runs it.
///
/// The store must be present in the configured roster — ingesting under a
/// typoed store name would silently fork the promotion history.
pub(crate) async fn run(
    store: &str,
    input: &Path,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
) -> anyhow::Result<()> {
    if valid_from > valid_until {
        anyhow::bail!("valid_from {valid_from} is after valid_until {valid_until}");
    }

    let config = promodb_core::load_app_config()?;

    let stores = promodb_core::load_stores(&config.stores_path)?;
    let Some(store_config) = stores.find(store) else {
        anyhow::bail!(
            "store '{store}' is not in the roster ({}); add it to ingest for it",
            config.stores_path.display()
        );
    };

    let content = std::fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", input.display()))?;
    let items: Vec<RawScrapeItem> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", input.display()))?;
    tracing::info!(store = %store_config.name, items = items.len(), "loaded scraped batch");

    let pool_config = promodb_db::PoolConfig::from_app_config(&config);
    let pool = promodb_db::connect_pool(&config.database_url, pool_config).await?;
    promodb_db::run_migrations(&pool).await?;

    let remote = OffClient::with_base_url(config.catalog_timeout_secs, &config.catalog_base_url)?;
    let matcher = CatalogMatcher::new(pool.clone(), remote);

    let enricher = match config.oracle_api_key.as_deref() {
        Some(api_key) => Enricher::new(
            OracleClient::with_base_url(
                api_key,
                &config.oracle_model,
                config.oracle_timeout_secs,
                &config.oracle_base_url,
            )?,
            config.oracle_batch_size,
            config.oracle_max_retries,
            config.oracle_retry_backoff_ms,
        ),
        None => {
            tracing::warn!("GEMINI_API_KEY not set; enrichment disabled for this run");
            Enricher::disabled()
        }
    };

    let reconciler = Reconciler::new(
        pool,
        matcher,
        enricher,
        config.pipeline_max_concurrent_groups,
    );

    let period = PromotionPeriod {
        valid_from,
        valid_until,
    };
    let summary = reconciler
        .run(
            &store_config.name,
            store_config.logo_url.as_deref(),
            period,
            items,
        )
        .await?;

    println!("store:        {}", store_config.name);
    println!("period:       {} .. {}", summary.valid_from, summary.valid_until);
    println!("matched:      {}", summary.matched);
    println!("not found:    {}", summary.not_found);
    println!("created:      {}", summary.created);
    println!("deactivated:  {}", summary.deactivated);
    println!("errors:       {}", summary.error_count());
    for error in &summary.errors {
        println!("  {} — {}", error.source_url, error.message);
    }

    Ok(())
}
