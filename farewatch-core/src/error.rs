//! Error types for farewatch.

use thiserror::Error;

/// Errors that can occur talking to the sheet store or the flight search API.
#[derive(Error, Debug)]
pub enum FarewatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not reach {service}: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response is missing '{field}'")]
    MissingField {
        service: &'static str,
        field: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },

    #[error("Token exchange failed: {0}")]
    Auth(String),

    #[error("'{operation}' is not available for the {variant} sheet variant")]
    Unsupported {
        operation: &'static str,
        variant: &'static str,
    },
}

/// Result type alias for farewatch operations.
pub type FarewatchResult<T> = Result<T, FarewatchError>;
