// src/error.rs

//! Unified error handling for the catalog feed.

use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport-level HTTP failure (unreachable host, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed responded with a non-success status code
    #[error("Feed request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a status error for a feed URL.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error came from acquiring the feed.
    ///
    /// Transport failures and non-success statuses are treated alike.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_url_and_code() {
        let err = AppError::status("https://example.com/feed", 404);
        let message = err.to_string();
        assert!(message.contains("https://example.com/feed"));
        assert!(message.contains("404"));
        assert!(err.is_fetch_error());
    }

    #[test]
    fn config_errors_are_not_fetch_errors() {
        assert!(!AppError::config("missing sheet id").is_fetch_error());
        assert!(!AppError::validation("bad").is_fetch_error());
    }
}
