//! Error types for exa-node.

use thiserror::Error;

/// Result type alias for exa-node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// exa-node error types.
///
/// Each variant carries a code that hosts can match on programmatically.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node error: {0}")]
    Node(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the error code for host-side matching.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Node(_) => "NODE_ERROR",
            Error::Credential(_) => "CREDENTIAL_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Node("x".into()).code(), "NODE_ERROR");
        assert_eq!(Error::Credential("x".into()).code(), "CREDENTIAL_ERROR");
        assert_eq!(Error::Config("x".into()).code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_display_carries_message() {
        let err = Error::Node("remote call failed".into());
        assert_eq!(err.to_string(), "Node error: remote call failed");
    }
}
