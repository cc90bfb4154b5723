//! HTTP request body builder.
//!
//! Turns the domain [`RequestBody`] into bytes for the wire.

use probe_domain::RequestBody;

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// The structured body could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of building a body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuiltBody {
    /// Bytes to send, if any.
    pub content: Option<Vec<u8>>,
    /// Content type implied by the body kind, if any.
    ///
    /// Only structured bodies imply one; raw bodies travel with whatever
    /// the test case declares.
    pub content_type: Option<String>,
}

/// Build the wire form of a request body.
///
/// # Errors
///
/// Returns an error if a structured body fails to serialize.
pub fn build_body(body: &RequestBody) -> Result<BuiltBody, BodyBuildError> {
    match body {
        RequestBody::None => Ok(BuiltBody::default()),
        RequestBody::Json { value } => Ok(BuiltBody {
            content: Some(serde_json::to_vec(value)?),
            content_type: Some(mime::APPLICATION_JSON.to_string()),
        }),
        RequestBody::Raw { content } => Ok(BuiltBody {
            content: Some(content.clone().into_bytes()),
            content_type: None,
        }),
    }
}
