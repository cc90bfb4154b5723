//! Probe Domain - Core test-harness types
//!
//! This crate defines the domain model for the Probe HTTP-contract
//! test harness. All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod presets;
pub mod request;
pub mod response;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use request::{BaseUrl, HttpMethod, RequestBody};
pub use response::{Outcome, TransportError};
pub use testing::{
    Expectation, JsonPath, PredicateError, Report, ReportEntry, SuiteDefinition, TestCase,
    TestCaseBuilder,
};
