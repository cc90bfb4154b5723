//! Request body variants

use serde::{Deserialize, Serialize};

/// Payload attached to a test case.
///
/// Exactly one of "no body", "structured JSON" or "raw bytes" is ever set;
/// the enum makes any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Structured value, encoded as JSON on the wire.
    Json {
        /// The value to encode.
        value: serde_json::Value,
    },
    /// Raw payload sent exactly as written, with whatever `Content-Type`
    /// the test case declares.
    Raw {
        /// The payload text.
        content: String,
    },
}

impl RequestBody {
    /// Creates a structured JSON body.
    #[must_use]
    pub const fn json(value: serde_json::Value) -> Self {
        Self::Json { value }
    }

    /// Creates a raw body.
    #[must_use]
    pub fn raw(content: impl Into<String>) -> Self {
        Self::Raw {
            content: content.into(),
        }
    }

    /// Returns whether there is no payload to send.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
