//! Declarative test cases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Expectation;
use crate::error::{DomainError, DomainResult};
use crate::request::{HttpMethod, RequestBody};

/// One request to send and how to judge its result.
///
/// Test cases are immutable once built; use [`TestCase::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    name: String,
    #[serde(default)]
    method: HttpMethod,
    path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "RequestBody::is_none")]
    body: RequestBody,
    #[serde(default)]
    expect: Expectation,
}

impl TestCase {
    /// Starts building a test case named `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TestCaseBuilder {
        TestCaseBuilder {
            case: Self {
                name: name.into(),
                method: HttpMethod::Get,
                path: "/".to_string(),
                headers: BTreeMap::new(),
                body: RequestBody::None,
                expect: Expectation::default(),
            },
        }
    }

    /// Unique name within a runner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path appended to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers, ordered by name.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Expectation applied to the outcome.
    #[must_use]
    pub const fn expect(&self) -> &Expectation {
        &self.expect
    }

    /// Returns whether a header is declared (case-insensitive).
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|key| key.eq_ignore_ascii_case(name))
    }

    /// Checks the name and headers.
    ///
    /// Cases built through the builder are already valid; this exists for
    /// cases that were deserialized from a suite file.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] for an empty name or an illegal header.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidIdentifier(
                "test case name must not be empty".to_string(),
            ));
        }
        for (name, value) in &self.headers {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(DomainError::InvalidHeaderName(name.clone()));
            }
            if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
                return Err(DomainError::InvalidHeaderValue(name.clone()));
            }
        }
        Ok(())
    }
}

/// RFC 9110 `tchar`.
const fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Builder for [`TestCase`].
#[derive(Debug, Clone)]
#[must_use]
pub struct TestCaseBuilder {
    case: TestCase,
}

impl TestCaseBuilder {
    /// Sets method and path.
    pub fn request(mut self, method: HttpMethod, path: impl Into<String>) -> Self {
        self.case.method = method;
        self.case.path = path.into();
        self
    }

    /// Shorthand for a GET request.
    pub fn get(self, path: impl Into<String>) -> Self {
        self.request(HttpMethod::Get, path)
    }

    /// Shorthand for a POST request.
    pub fn post(self, path: impl Into<String>) -> Self {
        self.request(HttpMethod::Post, path)
    }

    /// Adds a header, replacing any earlier value under the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.case.headers.insert(name.into(), value.into());
        self
    }

    /// Sends `value` encoded as JSON.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.case.body = RequestBody::json(value);
        self
    }

    /// Sends `content` as-is.
    pub fn raw(mut self, content: impl Into<String>) -> Self {
        self.case.body = RequestBody::raw(content);
        self
    }

    /// Sets the expectation.
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.case.expect = expectation;
        self
    }

    /// Finishes the test case.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if the case fails [`TestCase::validate`].
    pub fn build(self) -> DomainResult<TestCase> {
        self.case.validate()?;
        Ok(self.case)
    }
}
