//! Error types for the ledsync client

/// Errors that can occur in the ledsync client
#[derive(Debug, thiserror::Error)]
pub enum LedSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Panel API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ledsync operations
pub type Result<T> = std::result::Result<T, LedSyncError>;
