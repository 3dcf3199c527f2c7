use thiserror::Error;

/// Errors returned by the enrichment oracle client.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The oracle answered but not in the agreed envelope (no candidates,
    /// empty text, or an application-level refusal).
    #[error("oracle API error: {0}")]
    ApiError(String),

    /// The response (or the JSON array inside it) could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
