use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub stores_path: PathBuf,
    /// API key for the enrichment oracle; enrichment is disabled when unset.
    pub oracle_api_key: Option<String>,
    pub oracle_model: String,
    pub oracle_base_url: String,
    pub oracle_timeout_secs: u64,
    pub oracle_batch_size: usize,
    pub oracle_max_retries: u32,
    pub oracle_retry_backoff_ms: u64,
    pub catalog_base_url: String,
    pub catalog_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub pipeline_max_concurrent_groups: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("stores_path", &self.stores_path)
            .field("database_url", &"[redacted]")
            .field(
                "oracle_api_key",
                &self.oracle_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("oracle_model", &self.oracle_model)
            .field("oracle_base_url", &self.oracle_base_url)
            .field("oracle_timeout_secs", &self.oracle_timeout_secs)
            .field("oracle_batch_size", &self.oracle_batch_size)
            .field("oracle_max_retries", &self.oracle_max_retries)
            .field("oracle_retry_backoff_ms", &self.oracle_retry_backoff_ms)
            .field("catalog_base_url", &self.catalog_base_url)
            .field("catalog_timeout_secs", &self.catalog_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "pipeline_max_concurrent_groups",
                &self.pipeline_max_concurrent_groups,
            )
            .finish()
    }
}
