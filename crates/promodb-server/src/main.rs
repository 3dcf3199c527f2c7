mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use promodb_catalog::{CatalogMatcher, OffClient};
use promodb_enrich::{Enricher, OracleClient};
use promodb_pipeline::Reconciler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(promodb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = promodb_db::PoolConfig::from_app_config(&config);
    let pool = promodb_db::connect_pool(&config.database_url, pool_config).await?;
    promodb_db::run_migrations(&pool).await?;

    let stores = promodb_core::load_stores(&config.stores_path)?;

    // All external collaborators are constructed once here and injected;
    // nothing is lazily initialized on first use.
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
            tracing::warn!("GEMINI_API_KEY not set; enrichment disabled, runs use neutral defaults");
            Enricher::disabled()
        }
    };

    let reconciler = Reconciler::new(
        pool.clone(),
        matcher,
        enricher,
        config.pipeline_max_concurrent_groups,
    );

    let app = build_app(AppState {
        pool,
        reconciler: Arc::new(reconciler),
        stores: Arc::new(stores),
    });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "promodb server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
