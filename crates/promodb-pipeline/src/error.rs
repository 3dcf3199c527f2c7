use thiserror::Error;

/// Run-level failures: the pipeline itself could not execute.
///
/// Per-group failures never surface here — they are collected in the run
/// summary's error list instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Store-level database failure (store upsert or the deactivation
    /// barrier) that invalidates the whole run.
    #[error("store-level database failure: {0}")]
    Db(#[from] promodb_db::DbError),
}
