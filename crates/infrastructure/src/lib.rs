//! Probe Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus suite and report file formats.

pub mod adapters;
pub mod http;
pub mod report;
pub mod serialization;
pub mod suite;

pub use adapters::{ExecutorBuildError, ReqwestExecutor};
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use report::{render_json, render_text};
pub use serialization::{SerializationError, from_json, to_json_stable};
pub use suite::{SuiteFormat, SuiteLoadError, load_suite, parse_suite, render_suite, save_suite};
