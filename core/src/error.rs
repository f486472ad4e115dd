//! Error types for the Synthient API client.
//!
//! # Design
//! `ApiError` is the single failure category for every operation. The two
//! variants the server can trigger mirror the API's own taxonomy:
//! `ErrorResponse` relays the server's message for a well-defined client
//! problem (unauthorized, unknown token, conflict), while
//! `InternalServerError` carries a fixed client-side message and discards the
//! body. `Transport` and `Deserialization` cover failures that never reached a
//! status interpretation or produced a body of the wrong shape.

use thiserror::Error;

/// Fixed message for lookup and visits failures outside the known statuses.
pub const LOOKUP_FAILED: &str = "Server failed to lookup token.";

/// Fixed message for a delete answered with 500.
pub const DELETE_FAILED: &str = "Server failed to delete token.";

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server reported a client-side problem (401, 404 or 409).
    #[error("{message}")]
    ErrorResponse { status: u16, message: String },

    /// The server failed in a way the client cannot interpret.
    #[error("{0}")]
    InternalServerError(String),

    /// The request never produced a response (connect, timeout, proxy).
    #[error("transport failed: {0}")]
    Transport(String),

    /// A success response body did not match the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Human-readable message carried by server-triggered errors.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::ErrorResponse { message, .. } => Some(message),
            ApiError::InternalServerError(message) => Some(message),
            ApiError::Transport(_) | ApiError::Deserialization(_) => None,
        }
    }

    /// True when the caller can recover by fixing its input or credentials.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::ErrorResponse { .. })
    }
}

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid proxy {0}")]
    Proxy(String),
}
