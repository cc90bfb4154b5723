//! Suites: named, storable collections of test cases.

use serde::{Deserialize, Serialize};

use super::TestCase;
use crate::request::BaseUrl;

/// A suite as stored in a JSON or YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDefinition {
    /// Display name.
    pub name: String,
    /// Service root; when absent the caller's configured base URL is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<BaseUrl>,
    /// Per-request timeout override in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Test cases in execution order.
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

impl SuiteDefinition {
    /// Creates an empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: None,
            timeout_ms: None,
            cases: Vec::new(),
        }
    }

    /// Adds a test case (builder pattern).
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Check if the suite has no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Get the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }
}
