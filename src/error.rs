//! Error types for sat-dl
//!
//! The taxonomy follows the stages of a batch run:
//! - network and HTTP status failures from the service endpoints
//! - malformed response bodies (missing token, unparsable JSON)
//! - filesystem failures while reading credentials or writing packages
//! - corrupt or non-zip package archives
//!
//! Whether an error aborts a batch is decided by where it happens (authentication
//! and discovery are fatal, per-package work is not), not by its kind.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sat-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sat-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or user input error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the issue
        message: String,
        /// The configuration key that caused the error (e.g., "endpoints.auth_url")
        key: Option<String>,
    },

    /// Transport failure, including request timeouts
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("HTTP failure: {status} from {url}")]
    Http {
        /// HTTP status code returned by the service
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The service answered successfully but the body is not what the endpoint promises
    #[error("{endpoint} response malformed: {reason}")]
    MalformedResponse {
        /// Which endpoint produced the response ("auth", "query")
        endpoint: &'static str,
        /// What was wrong with the body
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A downloaded package is not a readable zip archive
    #[error("invalid archive {archive}: {reason}")]
    InvalidArchive {
        /// The archive file that could not be read
        archive: PathBuf,
        /// The reason the archive was rejected
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Returns true if the error came from the network or from an HTTP status
    pub fn is_http(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
