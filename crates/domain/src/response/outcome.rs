//! Normalized result of one HTTP attempt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TransportError;

/// Result of executing one test case.
///
/// `status_code` and `transport_error` are mutually exclusive: use
/// [`Outcome::response`] or [`Outcome::transport_failure`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// HTTP status code, absent when the exchange did not complete.
    pub status_code: Option<u16>,
    /// Response body decoded as UTF-8 (lossy), possibly empty.
    #[serde(default)]
    pub raw_body: String,
    /// Response headers with lower-cased names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Wall-clock time of the attempt in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
    /// Set iff the request could not be completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_error: Option<TransportError>,
    /// Why the test case failed, filled in by the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Outcome {
    /// Creates an outcome for a completed HTTP exchange.
    #[must_use]
    pub fn response(
        status_code: u16,
        headers: BTreeMap<String, String>,
        raw_body: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            status_code: Some(status_code),
            raw_body: raw_body.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            duration_ms,
            transport_error: None,
            diagnostic: None,
        }
    }

    /// Creates an outcome for an exchange that never completed.
    #[must_use]
    pub const fn transport_failure(error: TransportError, duration_ms: u64) -> Self {
        Self {
            status_code: None,
            raw_body: String::new(),
            headers: BTreeMap::new(),
            duration_ms,
            transport_error: Some(error),
            diagnostic: None,
        }
    }

    /// Returns true if the request could not be completed.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.transport_error.is_some()
    }

    /// Gets a response header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Attaches diagnostic text.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }
}
