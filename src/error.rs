//! Error types for sfexport
//!
//! Errors come in two tiers. [`Error`] is fatal and ends the run; it covers
//! configuration, login and query failures. [`DownloadError`] belongs to a
//! single file record and only skips that record.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sfexport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level (fatal) error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Salesforce API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Salesforce authentication failed ({code}): {message}")]
    Authentication { code: String, message: String },

    #[error("Session rejected by Salesforce: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Failed to connect to Salesforce: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<quick_xml::Error> for ApiError {
    fn from(err: quick_xml::Error) -> Self {
        ApiError::InvalidResponse(format!("Malformed SOAP response: {}", err))
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Salesforce username not found. Set SF_USERNAME in the environment or your .env file.")]
    MissingUsername,

    #[error("Salesforce password not found. Set SF_PASSWORD in the environment or your .env file.")]
    MissingPassword,
}

/// Failure while exporting one file record
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Http(#[from] ApiError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' cannot be used as a file name")]
    InvalidFileName(String),
}

impl DownloadError {
    /// True when the failure happened on the local side (naming or writing).
    pub fn is_local(&self) -> bool {
        !matches!(self, DownloadError::Http(_))
    }
}
