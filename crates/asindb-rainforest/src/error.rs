use thiserror::Error;

/// Errors produced while talking to the Rainforest API.
///
/// These stay internal to the crate's request path: public client operations
/// log them and degrade to [`crate::Upstream::Unavailable`] rather than
/// letting a transport fault propagate to callers. Only construction
/// surfaces them directly.
#[derive(Debug, Error)]
pub enum RainforestError {
    /// Network or TLS failure from the underlying HTTP client, or a non-2xx
    /// status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not a valid URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
