//! Expectations: declarative predicates over an [`Outcome`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::json_path::JsonPath;
use crate::response::Outcome;

/// How a test case judges its outcome.
///
/// Expectations are plain data so suites stay serializable. An outcome
/// whose request never completed satisfies none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    /// Status code equals `code`.
    StatusEquals {
        /// Expected status code.
        code: u16,
    },
    /// Status code is one of `codes`.
    StatusIn {
        /// Accepted status codes.
        codes: Vec<u16>,
    },
    /// Status code lies in `min..=max`.
    StatusRange {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// Body contains `text`.
    BodyContains {
        /// Text to search for.
        text: String,
        /// Case-insensitive search.
        #[serde(default)]
        ignore_case: bool,
    },
    /// Body matches a regular expression.
    BodyMatches {
        /// Regex pattern.
        pattern: String,
    },
    /// JSON path exists in the body, and equals `expected` when given.
    JsonPath {
        /// Path expression (e.g., `$.results[0].id`).
        path: String,
        /// Expected value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<serde_json::Value>,
    },
    /// Body parses as JSON.
    IsJson,
    /// Every nested expectation holds.
    All {
        /// Nested expectations, checked in order.
        of: Vec<Expectation>,
    },
}

/// The expectation itself cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// Status code outside 100..=599.
    #[error("status code {0} is outside 100-599")]
    InvalidStatusCode(u16),

    /// `status_in` with no codes.
    #[error("status set is empty")]
    EmptyStatusSet,

    /// `status_range` with `min > max`.
    #[error("status range {min}-{max} is inverted")]
    InvertedRange {
        /// Lower bound as given.
        min: u16,
        /// Upper bound as given.
        max: u16,
    },

    /// Regex pattern does not compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern as given.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// JSON path does not parse.
    #[error("invalid JSON path '{path}': {message}")]
    InvalidJsonPath {
        /// Path as given.
        path: String,
        /// Parser message.
        message: String,
    },

    /// `all` with nothing inside.
    #[error("conjunction has no expectations")]
    EmptyConjunction,
}

const fn check_code(code: u16) -> Result<u16, PredicateError> {
    if matches!(code, 100..=599) {
        Ok(code)
    } else {
        Err(PredicateError::InvalidStatusCode(code))
    }
}

impl Expectation {
    /// Expects an exact status code.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::StatusEquals { code }
    }

    /// Expects any 2xx status.
    #[must_use]
    pub const fn success() -> Self {
        Self::StatusRange { min: 200, max: 299 }
    }

    /// Expects one of several status codes.
    #[must_use]
    pub fn status_in(codes: impl IntoIterator<Item = u16>) -> Self {
        Self::StatusIn {
            codes: codes.into_iter().collect(),
        }
    }

    /// Expects every one of `expectations`.
    #[must_use]
    pub fn all(expectations: impl IntoIterator<Item = Self>) -> Self {
        Self::All {
            of: expectations.into_iter().collect(),
        }
    }

    /// Evaluates this expectation against an outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`PredicateError`] when the expectation is malformed. A
    /// malformed expectation is reported even for transport failures.
    pub fn evaluate(&self, outcome: &Outcome) -> Result<bool, PredicateError> {
        let status = outcome.status_code.filter(|_| !outcome.is_transport_failure());

        match self {
            Self::StatusEquals { code } => {
                let code = check_code(*code)?;
                Ok(status == Some(code))
            }
            Self::StatusIn { codes } => {
                if codes.is_empty() {
                    return Err(PredicateError::EmptyStatusSet);
                }
                for code in codes {
                    check_code(*code)?;
                }
                Ok(status.is_some_and(|s| codes.contains(&s)))
            }
            Self::StatusRange { min, max } => {
                check_code(*min)?;
                check_code(*max)?;
                if min > max {
                    return Err(PredicateError::InvertedRange {
                        min: *min,
                        max: *max,
                    });
                }
                Ok(status.is_some_and(|s| (*min..=*max).contains(&s)))
            }
            Self::BodyContains { text, ignore_case } => {
                let body = &outcome.raw_body;
                let found = if *ignore_case {
                    body.to_lowercase().contains(&text.to_lowercase())
                } else {
                    body.contains(text.as_str())
                };
                Ok(status.is_some() && found)
            }
            Self::BodyMatches { pattern } => {
                let regex = Regex::new(pattern).map_err(|e| {
                    PredicateError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(status.is_some() && regex.is_match(&outcome.raw_body))
            }
            Self::JsonPath { path, expected } => {
                let query =
                    JsonPath::parse(path).map_err(|message| PredicateError::InvalidJsonPath {
                        path: path.clone(),
                        message,
                    })?;
                if status.is_none() {
                    return Ok(false);
                }
                let Ok(document) = serde_json::from_str::<serde_json::Value>(&outcome.raw_body)
                else {
                    return Ok(false);
                };
                Ok(match (query.query(&document), expected) {
                    (Some(actual), Some(expected)) => actual == expected,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
            }
            Self::IsJson => Ok(status.is_some()
                && serde_json::from_str::<serde_json::Value>(&outcome.raw_body).is_ok()),
            Self::All { of } => {
                if of.is_empty() {
                    return Err(PredicateError::EmptyConjunction);
                }
                for expectation in of {
                    if !expectation.evaluate(outcome)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Get a human-readable description of this expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusEquals { code } => format!("status = {code}"),
            Self::StatusIn { codes } => {
                let codes: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("status in [{}]", codes.join(", "))
            }
            Self::StatusRange { min, max } => format!("status in {min}-{max}"),
            Self::BodyContains {
                text,
                ignore_case: false,
            } => format!("body contains '{text}'"),
            Self::BodyContains {
                text,
                ignore_case: true,
            } => format!("body contains '{text}' (ignoring case)"),
            Self::BodyMatches { pattern } => format!("body matches /{pattern}/"),
            Self::JsonPath {
                path,
                expected: Some(value),
            } => format!("JSON {path} equals {value}"),
            Self::JsonPath {
                path,
                expected: None,
            } => format!("JSON {path} exists"),
            Self::IsJson => "body is valid JSON".to_string(),
            Self::All { of } => {
                let parts: Vec<_> = of.iter().map(Self::description).collect();
                parts.join(" and ")
            }
        }
    }
}

impl Default for Expectation {
    fn default() -> Self {
        Self::success()
    }
}
