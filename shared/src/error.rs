//! Error types for the comedy show Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the comedy show Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing input, detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record store does not know the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream non-success response or transport failure
    #[error("Gateway error{}: {}", .status.map(|s| format!(" ({})", s)).unwrap_or_default(), .message)]
    Gateway {
        status: Option<u16>,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Status reported by the upstream service, if the error carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Gateway { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Gateway {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
