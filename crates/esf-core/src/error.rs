//! Error types for response decoding and option loading.

/// Error type for decoding a search results response body.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Response body is not a JSON object")]
    NotJson,
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Host reported an unsuccessful search")]
    Unsuccessful,
}

/// Error type for loading filter options from a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("Invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: f64 },
}
