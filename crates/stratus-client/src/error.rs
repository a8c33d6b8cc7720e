//! Service client error types.

use thiserror::Error;

/// Errors that can occur when calling a service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The transport failed to deliver the request.
    #[error("Transport failed: {0}")]
    Transport(#[from] anyhow::Error),

    /// No transport is configured and requests are not stubbed.
    #[error("No transport configured for {0}")]
    NoTransport(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    Request(String),

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Json(e.to_string())
    }
}
