mod ingest;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "promodb-cli")]
#[command(about = "promodb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run pending database migrations.
    Migrate,
    /// Reconcile a scraped batch file into the promotion store.
    Ingest {
        /// Store the batch belongs to (must exist in the roster).
        #[arg(long)]
        store: String,
        /// JSON file with the scraper's raw items.
        #[arg(long)]
        input: PathBuf,
        /// First day the promotions are valid (YYYY-MM-DD).
        #[arg(long)]
        valid_from: NaiveDate,
        /// Last day the promotions are valid (YYYY-MM-DD).
        #[arg(long)]
        valid_until: NaiveDate,
    },
    /// List active promotions.
    Promotions {
        /// Restrict to one store by name.
        #[arg(long)]
        store: Option<String>,
    },
    /// Show reference catalog statistics.
    CatalogStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate => migrate().await,
        Commands::Ingest {
            store,
            input,
            valid_from,
            valid_until,
        } => ingest::run(&store, &input, valid_from, valid_until).await,
        Commands::Promotions { store } => promotions(store.as_deref()).await,
        Commands::CatalogStats => catalog_stats().await,
    }
}

async fn migrate() -> anyhow::Result<()> {
    let pool = promodb_db::connect_pool_from_env().await?;
    let applied = promodb_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

async fn promotions(store: Option<&str>) -> anyhow::Result<()> {
    let pool = promodb_db::connect_pool_from_env().await?;
    let rows = match store {
        Some(name) => promodb_db::get_active_promotions_by_store_name(&pool, name).await?,
        None => promodb_db::get_active_promotions(&pool, None).await?,
    };

    if rows.is_empty() {
        println!("no active promotions");
        return Ok(());
    }

    for row in rows {
        let price = row
            .promo_price
            .map_or_else(|| "-".to_string(), |p| format!("€{p}"));
        println!(
            "{:<10} {:<50} {:<16} {:>8}  until {}",
            row.store_name,
            row.display_name,
            row.discount_label.as_deref().unwrap_or("-"),
            price,
            row.valid_until
        );
    }
    Ok(())
}

async fn catalog_stats() -> anyhow::Result<()> {
    let pool = promodb_db::connect_pool_from_env().await?;
    let stats = promodb_db::catalog_stats(&pool).await?;
    println!("catalog entries:      {}", stats.total_entries);
    println!("entries with macros:  {}", stats.with_macros);
    Ok(())
}
