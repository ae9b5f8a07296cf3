//! Error types for LINE platform operations.
//!
//! Signature failures are kept apart from every other error because the
//! webhook handler answers them with a client error while everything else
//! is a server error.

use thiserror::Error;

/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors from webhook verification, parsing and LINE API calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Webhook signature missing or not matching the channel secret.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Webhook body is not a valid LINE webhook payload.
    #[error("malformed webhook payload: {message}")]
    MalformedPayload {
        /// Parser error message
        message: String,
    },

    /// Network-level connectivity failure.
    #[error("network connection failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// LINE API call exceeded the client timeout.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Configured timeout in seconds
        timeout_seconds: u64,
    },

    /// LINE API answered with a non-success status.
    #[error("LINE API error: HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message reported by the API
        message: String,
    },

    /// Client misconfiguration.
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl PlatformError {
    /// Creates a malformed payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload { message: message.into() }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates an API error from a response status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status, message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether this error means the webhook failed authentication.
    pub fn is_signature_error(&self) -> bool {
        matches!(self, Self::InvalidSignature)
    }
}
