//! Test modeling: cases, expectations, suites and reports.

mod case;
mod expectation;
mod json_path;
mod report;
mod suite;

pub use case::{TestCase, TestCaseBuilder};
pub use expectation::{Expectation, PredicateError};
pub use json_path::JsonPath;
pub use report::{Report, ReportEntry};
pub use suite::SuiteDefinition;
