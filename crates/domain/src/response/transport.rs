//! Transport-level failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to complete an HTTP exchange at the network or connection level.
///
/// This is data, not control flow: the executor records it in the
/// [`Outcome`](super::Outcome) and the run carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    /// The server actively refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// No response within the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    Dns {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// TLS handshake or certificate failure.
    #[error("TLS error: {message}")]
    Tls {
        /// Underlying message.
        message: String,
    },

    /// The joined request URL is not a valid URL.
    #[error("invalid URL: {message}")]
    InvalidUrl {
        /// Underlying message.
        message: String,
    },

    /// The request could not be built (bad header, unserializable body).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Underlying message.
        message: String,
    },

    /// Any other connection-level failure.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        /// Underlying message.
        message: String,
    },

    /// The response body could not be read to completion.
    #[error("failed to read response body: {message}")]
    Body {
        /// Underlying message.
        message: String,
    },

    /// Anything not covered above.
    #[error("{message}")]
    Other {
        /// Underlying message.
        message: String,
    },
}

impl TransportError {
    /// Shorthand for [`TransportError::Other`].
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Returns a short human-readable title for this failure.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ConnectionRefused { .. } => "Connection Refused",
            Self::Timeout { .. } => "Request Timeout",
            Self::Dns { .. } => "DNS Resolution Failed",
            Self::Tls { .. } => "SSL/TLS Error",
            Self::InvalidUrl { .. } => "Invalid URL",
            Self::InvalidRequest { .. } => "Invalid Request",
            Self::ConnectionFailed { .. } => "Connection Failed",
            Self::Body { .. } => "Response Body Error",
            Self::Other { .. } => "Unknown Error",
        }
    }
}
