//! Error types for Metasys API operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during Metasys API operations.
#[derive(Debug, Error)]
pub enum MetasysError {
    /// Configuration is missing or incomplete.
    #[error("Metasys configuration required: {0}")]
    ConfigMissing(String),

    /// Login or token refresh was rejected by the server.
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// Login/refresh response was valid JSON but did not contain a usable
    /// access token and expiry.
    #[error("could not extract access token: {0}")]
    TokenExtraction(String),

    /// The request exceeded the transport deadline.
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// HTTP transport error (connection, TLS, ...), excluding timeouts.
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx response outside the cases handled by a specific operation.
    #[error("Metasys API error (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// Response body was not valid JSON.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Identifier lookup returned a value that is not a valid object id.
    #[error("'{value}' is not a valid object identifier")]
    IdentifierFormat {
        value: String,
        #[source]
        source: uuid::Error,
    },

    /// A 2xx read response was missing the expected nested attribute field.
    #[error("response for object {id} did not contain attribute '{attribute}'")]
    PropertyAccess { id: Uuid, attribute: String },

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The blocking wrapper could not start its runtime.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl MetasysError {
    /// True if this error is an HTTP 404 from the server.
    ///
    /// Operations that translate not-found into an absent result use this
    /// to distinguish it from other failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetasysError::Http { status: 404, .. })
    }

    /// Classify a `reqwest` error as timeout or transport failure.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MetasysError::Timeout(err)
        } else {
            MetasysError::Transport(err)
        }
    }
}

/// Result type alias for Metasys operations.
pub type Result<T> = core::result::Result<T, MetasysError>;
