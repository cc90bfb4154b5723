//! Report output: console text and JSON.

mod text;

use probe_domain::Report;

use crate::serialization::{SerializationError, to_json_stable};

pub use text::render_text;

/// Renders a report as deterministic, pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &Report) -> Result<String, SerializationError> {
    to_json_stable(report)
}
