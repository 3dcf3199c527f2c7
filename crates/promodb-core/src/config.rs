use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("PROMODB_ENV", "development"));

    let bind_addr = parse_addr("PROMODB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PROMODB_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default("PROMODB_STORES_PATH", "./config/stores.yaml"));

    let oracle_api_key = lookup("GEMINI_API_KEY").ok();
    let oracle_model = or_default("PROMODB_ORACLE_MODEL", "gemini-2.5-flash");
    let oracle_base_url = or_default(
        "PROMODB_ORACLE_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let oracle_timeout_secs = parse_u64("PROMODB_ORACLE_TIMEOUT_SECS", "30")?;
    let oracle_batch_size = parse_usize("PROMODB_ORACLE_BATCH_SIZE", "20")?;
    let oracle_max_retries = parse_u32("PROMODB_ORACLE_MAX_RETRIES", "3")?;
    let oracle_retry_backoff_ms = parse_u64("PROMODB_ORACLE_RETRY_BACKOFF_MS", "500")?;

    let catalog_base_url = or_default(
        "PROMODB_CATALOG_BASE_URL",
        "https://world.openfoodfacts.org",
    );
    let catalog_timeout_secs = parse_u64("PROMODB_CATALOG_TIMEOUT_SECS", "5")?;

    let db_max_connections = parse_u32("PROMODB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PROMODB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PROMODB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let pipeline_max_concurrent_groups = parse_usize("PROMODB_PIPELINE_MAX_CONCURRENT_GROUPS", "4")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        stores_path,
        oracle_api_key,
        oracle_model,
        oracle_base_url,
        oracle_timeout_secs,
        oracle_batch_size,
        oracle_max_retries,
        oracle_retry_backoff_ms,
        catalog_base_url,
        catalog_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        pipeline_max_concurrent_groups,
    })
}

/// Maps the raw `PROMODB_ENV` value to an [`Environment`].
///
/// Unknown values fall back to `Development` so a typo can never silently
/// enable production behavior.
fn parse_environment(raw: &str) -> Environment {
    match raw.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
