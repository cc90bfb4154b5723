//! Deterministic JSON serialization for suites and reports.
//!
//! Output is stable across runs:
//! - Object keys in declaration order, maps sorted (`BTreeMap` in domain types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::{SerializationError, from_json, to_json_stable};
